use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("empty input code")]
    EmptyCode,
    #[error("duplicate input code: {0}")]
    Duplicate(String),
    #[error("binding index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered set of symbolic input codes that must be held together.
///
/// Order is press order. A code appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ButtonBinding(SmallVec<[String; 4]>);

impl ButtonBinding {
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    /// Build a binding from codes, rejecting duplicates and empty codes.
    pub fn new<I, S>(codes: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut binding = Self::empty();
        for code in codes {
            binding.push(code)?;
        }
        Ok(binding)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Insert a code at the end if absent. Returns whether it was added.
    pub fn insert(&mut self, code: &str) -> bool {
        if self.contains(code) {
            return false;
        }
        self.0.push(code.to_owned());
        true
    }

    /// Remove a code. Returns whether it was present.
    pub fn remove(&mut self, code: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != code);
        before != self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Append a manually entered code.
    pub fn push(&mut self, code: impl Into<String>) -> Result<(), BindingError> {
        let code = code.into();
        if code.is_empty() {
            return Err(BindingError::EmptyCode);
        }
        if self.contains(&code) {
            return Err(BindingError::Duplicate(code));
        }
        self.0.push(code);
        Ok(())
    }

    /// Replace the code at `index`, keeping its position.
    pub fn replace_at(
        &mut self,
        index: usize,
        code: impl Into<String>,
    ) -> Result<(), BindingError> {
        let code = code.into();
        let len = self.0.len();
        if index >= len {
            return Err(BindingError::OutOfRange { index, len });
        }
        if code.is_empty() {
            return Err(BindingError::EmptyCode);
        }
        if self.0[index] == code {
            return Ok(());
        }
        if self.contains(&code) {
            return Err(BindingError::Duplicate(code));
        }
        self.0[index] = code;
        Ok(())
    }
}

impl TryFrom<Vec<String>> for ButtonBinding {
    type Error = BindingError;

    fn try_from(codes: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(codes)
    }
}

impl From<ButtonBinding> for Vec<String> {
    fn from(binding: ButtonBinding) -> Self {
        binding.0.into_vec()
    }
}

impl fmt::Display for ButtonBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_press_order_and_skips_duplicates() {
        let mut b = ButtonBinding::empty();
        assert!(b.insert("ShiftLeft"));
        assert!(b.insert("KeyA"));
        assert!(!b.insert("ShiftLeft"));
        assert_eq!(b.as_slice(), ["ShiftLeft", "KeyA"]);
        assert_eq!(b.to_string(), "ShiftLeft+KeyA");
    }

    #[test]
    fn remove_reports_presence() {
        let mut b = ButtonBinding::new(["KeyA", "KeyB"]).unwrap();
        assert!(b.remove("KeyA"));
        assert!(!b.remove("KeyA"));
        assert_eq!(b.as_slice(), ["KeyB"]);
    }

    #[test]
    fn manual_edits_reject_duplicates_and_empty_codes() {
        let mut b = ButtonBinding::new(["KeyA", "KeyB"]).unwrap();
        assert_eq!(b.push(""), Err(BindingError::EmptyCode));
        assert_eq!(b.push("KeyA"), Err(BindingError::Duplicate("KeyA".into())));
        assert_eq!(
            b.replace_at(0, "KeyB"),
            Err(BindingError::Duplicate("KeyB".into()))
        );
        assert_eq!(
            b.replace_at(5, "KeyC"),
            Err(BindingError::OutOfRange { index: 5, len: 2 })
        );

        b.replace_at(0, "KeyC").unwrap();
        b.replace_at(1, "KeyB").unwrap();
        assert_eq!(b.as_slice(), ["KeyC", "KeyB"]);
    }

    #[test]
    fn serializes_as_string_array() {
        let b = ButtonBinding::new(["ControlLeft", "ScrollDown"]).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"["ControlLeft","ScrollDown"]"#);
    }

    #[test]
    fn deserialize_rejects_duplicates() {
        let err = serde_json::from_str::<ButtonBinding>(r#"["KeyA","KeyA"]"#);
        assert!(err.is_err());
    }
}
