pub mod bits;
pub mod features;
pub mod imm;
pub mod label;

pub use bits::InsnWord;
pub use features::{FeatureError, Features};
pub use imm::{fits, is_imm_in_range, is_unsigned_imm_in_range, Imm};
pub use label::{Label, LabelUse, RelocKind};
