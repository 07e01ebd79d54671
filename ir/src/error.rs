use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Gradient links are write-once.
    #[snafu(display("value {value} already has a gradient"))]
    GradAlreadySet { value: u64 },

    /// Only tensor-like values take part in gradient tracking.
    #[snafu(display("value {value} is not a tensor and cannot carry a gradient"))]
    GradOnObject { value: u64 },
}
