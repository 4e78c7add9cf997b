use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::classification::domain::gender::Gender;
use crate::pipeline::error_kind::ErrorKind;

/// Terminal outcome of one verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassificationResult {
    Verified { gender: Gender },
    Rejected(ErrorKind),
}

impl ClassificationResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, ClassificationResult::Verified { .. })
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            ClassificationResult::Verified { .. } => None,
            ClassificationResult::Rejected(kind) => Some(*kind),
        }
    }
}

/// `{"verified": true, "gender": "M"}` or `{"verified": false, "error": "<message>"}`.
impl Serialize for ClassificationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ClassificationResult", 2)?;
        match self {
            ClassificationResult::Verified { gender } => {
                state.serialize_field("verified", &true)?;
                state.serialize_field("gender", gender)?;
            }
            ClassificationResult::Rejected(kind) => {
                state.serialize_field("verified", &false)?;
                state.serialize_field("error", &kind.to_string())?;
            }
        }
        state.end()
    }
}
