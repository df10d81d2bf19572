pub mod field;
pub mod grade;
pub mod protocol;
pub mod record;
pub mod selftest;

pub use field::{Field, FieldCoverage};
pub use grade::{GradeStatus, GradedDevice, InsufficientDataNote, ReasonCode};
pub use protocol::{MediaClass, Protocol};
pub use record::{DeviceIdentity, HealthRecord};
pub use selftest::{SelfTestEntry, SelfTestOutcome};
