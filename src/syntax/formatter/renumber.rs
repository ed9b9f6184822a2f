//! Field-number renumbering over nested scopes.
//!
//! Messages and enums each own a counter. A oneof owns none: its fields draw
//! from the enclosing message's counter, so numbering continues across the
//! oneof boundary in both directions.

use super::line::HeaderKind;
use super::options::RenumberOptions;
use crate::syntax::ast::{IMPLEMENTATION_RESERVED, MAX_ENUM_VALUE, MAX_FIELD_NUMBER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Message { counter: i64 },
    Enum { counter: i64 },
    Oneof,
    Other,
}

#[derive(Debug, Clone)]
pub(super) struct Renumberer {
    options: RenumberOptions,
    stack: Vec<Scope>,
}

impl Renumberer {
    pub(super) fn new(options: RenumberOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
        }
    }

    /// A `{` was seen; `header` is the declaration it opens, if any.
    pub(super) fn enter(&mut self, header: Option<HeaderKind>) {
        let scope = match header {
            Some(HeaderKind::Message) => Scope::Message {
                counter: self.options.start_number,
            },
            Some(HeaderKind::Enum) => Scope::Enum { counter: 0 },
            Some(HeaderKind::Oneof) => Scope::Oneof,
            Some(HeaderKind::Service | HeaderKind::Extend) | None => Scope::Other,
        };
        self.stack.push(scope);
    }

    /// A `}` was seen.
    pub(super) fn exit(&mut self) {
        self.stack.pop();
    }

    pub(super) fn in_enum(&self) -> bool {
        matches!(self.stack.last(), Some(Scope::Enum { .. }))
    }

    /// Number for a message field. Returns the number to insert when the
    /// field has none, and advances the shared counter either way. Fields
    /// outside a message (or oneof within one) are left alone. An explicit
    /// number outside `1..=MAX_FIELD_NUMBER` leaves the counter where it is.
    pub(super) fn field(&mut self, explicit: Option<i64>) -> Option<i64> {
        let increment = self.options.increment;
        let counter = self.message_counter()?;
        match explicit {
            Some(number) => {
                if (1..=MAX_FIELD_NUMBER).contains(&number) {
                    *counter = number.saturating_add(increment);
                }
                None
            }
            None => {
                let mut number = *counter;
                if IMPLEMENTATION_RESERVED.contains(&number) {
                    number = IMPLEMENTATION_RESERVED.end() + 1;
                }
                *counter = number.saturating_add(increment);
                Some(number)
            }
        }
    }

    /// Number for an enum value; same contract as [`Renumberer::field`].
    pub(super) fn enum_value(&mut self, explicit: Option<i64>) -> Option<i64> {
        let increment = self.options.increment;
        let Some(Scope::Enum { counter }) = self.stack.last_mut() else {
            return None;
        };
        match explicit {
            Some(number) => {
                if (i64::from(i32::MIN)..=MAX_ENUM_VALUE).contains(&number) {
                    *counter = number.saturating_add(increment);
                }
                None
            }
            None => {
                let number = *counter;
                *counter = number.saturating_add(increment);
                Some(number)
            }
        }
    }

    /// Counter of the innermost message, looking through oneofs.
    fn message_counter(&mut self) -> Option<&mut i64> {
        for scope in self.stack.iter_mut().rev() {
            match scope {
                Scope::Message { counter } => return Some(counter),
                Scope::Oneof => continue,
                Scope::Enum { .. } | Scope::Other => return None,
            }
        }
        None
    }
}
