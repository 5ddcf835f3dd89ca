/// The maximum number of steps the reference driver will advance a program
/// before giving up. Programs that finish in exactly this many steps
/// terminate normally; one more and the driver reports
/// [`crate::driver::DriverError::TooManySteps`].
pub const MAX_STEP_COUNT: usize = 1_000_000;
