//! `PropertySet` and the standard properties passes report through it.
//!
//! Passes share data by storing typed values in a [`PropertySet`], keyed by
//! type. The scheduler reports [`ScheduleStats`]; the verification pass
//! reports a [`crate::passes::VerificationResult`].
//!
//! # Examples
//!
//! ```
//! use jaqal_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct GateBudget(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(GateBudget(64));
//!
//! assert_eq!(props.get::<GateBudget>(), Some(&GateBudget(64)));
//! assert_eq!(props.remove::<GateBudget>(), Some(GateBudget(64)));
//! assert!(props.get::<GateBudget>().is_none());
//! ```

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::ops::AddAssign;

/// Counters produced by the parallel scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStats {
    /// Unscheduled blocks rewritten.
    pub blocks_scheduled: usize,
    /// Moments created across all rewritten blocks.
    pub moments: usize,
    /// Moments that became parallel blocks.
    pub parallel_moments: usize,
    /// Statements placed into moments.
    pub statements_placed: usize,
}

impl AddAssign for ScheduleStats {
    fn add_assign(&mut self, rhs: Self) {
        self.blocks_scheduled += rhs.blocks_scheduled;
        self.moments += rhs.moments;
        self.parallel_moments += rhs.parallel_moments;
        self.statements_placed += rhs.statements_placed;
    }
}

/// Type-keyed storage shared by the passes of one compilation.
#[derive(Debug, Default)]
pub struct PropertySet {
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, replacing any previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }

    /// Check whether a property of type `T` is present.
    pub fn contains<T: Any>(&self) -> bool {
        self.custom.contains_key(&TypeId::of::<T>())
    }
}
