use test_case::test_case;
use weave_ir::{Adapter, Arg, DeviceSpec, Kwargs, Node, NodeKind, Prim, PrimKind};

use super::{parameter, tensor};
use crate::config::EmitConfig;
use crate::emit::{CallSite, FuncEmitter, Overlap, async_overlap_legal, check_overlap};
use crate::error::Error;

fn adapter_node(adapter: Adapter, device: Vec<usize>) -> Node {
    Node::builder().id(20).name("adapter").kind(NodeKind::Adapter(adapter)).device(device).build()
}

fn chunk_then_all_reduce(group: [usize; 2]) -> Adapter {
    let mut kwargs = Kwargs::new();
    kwargs.insert("dim".into(), Arg::from(0));
    Adapter::from_prims(vec![
        Prim::builder()
            .kind(PrimKind::Chunk)
            .inputs(vec![tensor("x", 1).into()])
            .outputs(vec![tensor("c", 2).into()])
            .kwargs(kwargs)
            .device(vec![0])
            .build(),
        Prim::builder()
            .kind(PrimKind::AllReduce)
            .inputs(vec![tensor("c", 2).into()])
            .outputs(vec![tensor("r", 3).into()])
            .device(group.to_vec())
            .build(),
    ])
}

#[test_case(vec![(false, vec![0]), (true, vec![0, 1]), (true, vec![1, 0])], Overlap::Legal ; "local prefix then same group")]
#[test_case(vec![(true, vec![0, 1]), (true, vec![0, 1])], Overlap::Legal ; "collectives only")]
#[test_case(vec![(false, vec![0]), (false, vec![0])], Overlap::Legal ; "no collectives")]
#[test_case(vec![], Overlap::Legal ; "empty")]
#[test_case(vec![(true, vec![0]), (false, vec![0])], Overlap::NonCollectiveAfterCollective ; "local after collective")]
#[test_case(vec![(false, vec![0]), (true, vec![0, 1]), (false, vec![0])], Overlap::NonCollectiveAfterCollective ; "local on both sides")]
#[test_case(vec![(true, vec![0, 1]), (true, vec![2, 3])], Overlap::MixedDeviceGroups ; "different groups")]
#[test_case(vec![(true, vec![0, 1]), (true, vec![0, 1, 2])], Overlap::MixedDeviceGroups ; "superset group")]
fn test_check_overlap(shape: Vec<(bool, Vec<usize>)>, expected: Overlap) {
    let kwargs = Kwargs::new();
    let sites: Vec<CallSite<'_>> = shape
        .iter()
        .map(|(collective, device)| CallSite {
            signature: "f",
            inputs: &[],
            outputs: &[],
            kwargs: &kwargs,
            collective: *collective,
            device,
        })
        .collect();

    assert_eq!(check_overlap(&sites), expected);
    assert_eq!(async_overlap_legal(&sites), expected == Overlap::Legal);
}

#[test]
fn test_sync_emission() {
    let node = adapter_node(chunk_then_all_reduce([0, 1]), vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, false).unwrap();
    assert_eq!(
        lines,
        vec!["c_2 = weave.runtime.adapter.chunk(x_1, dim=0)", "r_3 = weave.runtime.adapter.all_reduce(c_2)"]
    );
}

#[test]
fn test_async_marks_collectives_only() {
    let node = adapter_node(chunk_then_all_reduce([0, 1]), vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, true).unwrap();
    assert_eq!(
        lines,
        vec![
            "c_2 = weave.runtime.adapter.chunk(x_1, dim=0)",
            "r_3 = weave.runtime.adapter.all_reduce(c_2, async_op=True)",
        ]
    );
}

#[test]
fn test_async_applies_to_every_collective() {
    let mut adapter = chunk_then_all_reduce([0, 1]);
    adapter.prims.push(
        Prim::builder()
            .kind(PrimKind::AllGather)
            .inputs(vec![tensor("r", 3).into()])
            .outputs(vec![tensor("g", 4).into()])
            .device(vec![1, 0])
            .build(),
    );
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, true).unwrap();
    assert_eq!(
        lines,
        vec![
            "c_2 = weave.runtime.adapter.chunk(x_1, dim=0)",
            "r_3 = weave.runtime.adapter.all_reduce(c_2, async_op=True)",
            "g_4 = weave.runtime.adapter.all_gather(r_3, async_op=True)",
        ]
    );
}

#[test]
fn test_async_downgrades_after_local_call() {
    let mut adapter = chunk_then_all_reduce([0, 1]);
    adapter.prims.rotate_left(1);
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, true).unwrap();
    assert!(lines.iter().all(|line| !line.contains("async_op")), "{lines:#?}");
}

#[test]
fn test_async_downgrades_on_mixed_groups() {
    let mut adapter = chunk_then_all_reduce([0, 1]);
    adapter.prims.push(
        Prim::builder()
            .kind(PrimKind::AllGather)
            .inputs(vec![tensor("r", 3).into()])
            .outputs(vec![tensor("g", 4).into()])
            .device(vec![2, 3])
            .build(),
    );
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, true).unwrap();
    assert!(lines.iter().all(|line| !line.contains("async_op")), "{lines:#?}");
}

#[test]
fn test_async_overwrites_existing_flag() {
    let mut kwargs = Kwargs::new();
    kwargs.insert("async_op".into(), Arg::from(false));
    kwargs.insert("dtype".into(), Arg::from("torch.float16"));
    let adapter = Adapter::from_prims(vec![
        Prim::builder()
            .kind(PrimKind::Broadcast)
            .inputs(vec![tensor("x", 1).into()])
            .outputs(vec![tensor("y", 2).into()])
            .kwargs(kwargs)
            .device(vec![0, 1])
            .build(),
    ]);
    let node = adapter_node(adapter, vec![1]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, true).unwrap();
    assert_eq!(lines, vec!["y_2 = weave.runtime.adapter.broadcast(x_1, async_op=True, dtype=torch.float16)"]);
}

#[test]
fn test_multiple_inputs_form_a_tuple() {
    let adapter = Adapter::from_prims(vec![
        Prim::builder()
            .kind(PrimKind::Merge)
            .signature("weave.runtime.adapter.merge_cat")
            .inputs(vec![tensor("a", 1).into(), tensor("b", 2).into()])
            .outputs(vec![tensor("m", 3).into()])
            .device(vec![0])
            .build(),
    ]);
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, false).unwrap();
    assert_eq!(lines, vec!["m_3 = weave.runtime.adapter.merge_cat((a_1, b_2, ))"]);
}

#[test]
fn test_custom_adapter_is_one_call() {
    let adapter = Adapter::custom("weave.runtime.adapter.redistribute", vec![]);
    let node = Node::builder()
        .id(21)
        .name("adapter")
        .kind(NodeKind::Adapter(adapter))
        .inputs(vec![tensor("x", 1).into()])
        .outputs(vec![tensor("y", 2).into()])
        .device(vec![0])
        .build();

    let lines = FuncEmitter::default().emit_adapter(&node, None, true).unwrap();
    assert_eq!(lines, vec!["y_2 = weave.runtime.adapter.redistribute(x_1)"]);
}

#[test]
fn test_outputs_discarded_when_empty() {
    let adapter = Adapter::from_prims(vec![
        Prim::builder().kind(PrimKind::AllReduce).inputs(vec![tensor("x", 1).into()]).device(vec![0, 1]).build(),
    ]);
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, false).unwrap();
    assert_eq!(lines, vec!["_ = weave.runtime.adapter.all_reduce(x_1)"]);
}

#[test]
fn test_timer_probe_per_call() {
    let emitter = FuncEmitter::new(EmitConfig::builder().line_timer(true).build(), Default::default());
    let node = adapter_node(chunk_then_all_reduce([0, 1]), vec![0]);

    let lines = emitter.emit_adapter(&node, None, false).unwrap();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "weave.runtime.function.print_time('weave.runtime.adapter.chunk')");
    assert_eq!(lines[2], "weave.runtime.function.print_time('weave.runtime.adapter.all_reduce')");
}

#[test_case(vec![] ; "undispatched")]
#[test_case(vec![0, 1] ; "multiple devices")]
fn test_adapter_must_be_dispatched(device: Vec<usize>) {
    let node = adapter_node(chunk_then_all_reduce([0, 1]), device.clone());

    let err = FuncEmitter::default().emit_adapter(&node, None, false).unwrap_err();
    assert_eq!(err, Error::AdapterNotDispatched { node: "adapter20".into(), devices: device });
}

#[test]
fn test_non_adapter_is_rejected() {
    let node = Node::builder().id(22).name("relu").kind(NodeKind::fw_op("torch.relu")).device(vec![0]).build();
    assert!(FuncEmitter::default().emit_adapter(&node, None, false).is_err());
}

#[test]
fn test_device_kwarg_stays_quoted() {
    let mut kwargs = Kwargs::new();
    kwargs.insert("device".into(), Arg::from(DeviceSpec::cuda(1)));
    let adapter = Adapter::from_prims(vec![
        Prim::builder()
            .kind(PrimKind::Move)
            .inputs(vec![tensor("x", 1).into()])
            .outputs(vec![tensor("y", 2).into()])
            .kwargs(kwargs)
            .device(vec![0])
            .build(),
    ]);
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, None, false).unwrap();
    assert_eq!(lines, vec!["y_2 = weave.runtime.adapter.move(x_1, device='cuda:1')"]);
}

#[test]
fn test_prefix_applies_to_inputs_only() {
    let w = parameter("w", 1);
    let shard = parameter("w_shard", 3);
    let adapter = Adapter::from_prims(vec![
        Prim::builder()
            .kind(PrimKind::Select)
            .inputs(vec![Arg::from(&w)])
            .outputs(vec![Arg::from(&shard)])
            .device(vec![0])
            .build(),
        Prim::builder()
            .kind(PrimKind::Merge)
            .inputs(vec![Arg::from(&w), tensor("x", 2).into()])
            .outputs(vec![tensor("m", 4).into()])
            .device(vec![0])
            .build(),
    ]);
    let node = adapter_node(adapter, vec![0]);

    let lines = FuncEmitter::default().emit_adapter(&node, Some("self."), false).unwrap();
    assert_eq!(
        lines,
        vec![
            "w_shard_3 = weave.runtime.adapter.select(self.w_1)",
            "m_4 = weave.runtime.adapter.merge((self.w_1, x_2, ))",
        ]
    );
}
