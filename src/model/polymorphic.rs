//! Polymorphic payloads
//!
//! A partition may hold rows of several kinds. The store keeps every payload
//! as a type-erased `RowValue`; reading it back always goes through a
//! fallible downcast, either to a single concrete type or to one variant of a
//! closed `PossibleItemTypes` enum.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::item::{ExpectedVersion, RowStatus};
use super::key::{CompositePrimaryKey, PrimaryKeyAttributes};

/// Type-erased payload, tagged with the name of its concrete type
#[derive(Clone)]
pub struct RowValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl RowValue {
    pub fn new<V: Send + Sync + 'static>(value: V) -> Self {
        Self {
            type_name: std::any::type_name::<V>(),
            value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<V: 'static>(&self) -> bool {
        (*self.value).is::<V>()
    }

    /// Clone the payload out if it is a `V`
    pub fn downcast<V: Clone + 'static>(&self) -> Option<V> {
        (*self.value).downcast_ref::<V>().cloned()
    }
}

impl fmt::Debug for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A closed set of payload types that may share a partition
///
/// Usually implemented through [`possible_item_types!`](crate::possible_item_types).
pub trait PossibleItemTypes: Sized + Clone + Send + Sync + 'static {
    /// Resolve a stored payload to one of the variants, `None` if it is none of them
    fn from_row_value(value: &RowValue) -> Option<Self>;

    /// Erase the active variant's payload (not the enum itself)
    fn into_row_value(self) -> RowValue;
}

/// Declare an enum of payload variants and implement [`PossibleItemTypes`] for it
///
/// ```
/// use dyntable::possible_item_types;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Order { pub total: u64 }
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Refund { pub amount: u64 }
///
/// possible_item_types! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum AccountRow {
///         Order(Order),
///         Refund(Refund),
///     }
/// }
/// ```
#[macro_export]
macro_rules! possible_item_types {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant($ty)),+
        }

        impl $crate::PossibleItemTypes for $name {
            fn from_row_value(value: &$crate::RowValue) -> ::std::option::Option<Self> {
                $(
                    if let ::std::option::Option::Some(inner) = value.downcast::<$ty>() {
                        return ::std::option::Option::Some($name::$variant(inner));
                    }
                )+
                ::std::option::Option::None
            }

            fn into_row_value(self) -> $crate::RowValue {
                match self {
                    $($name::$variant(inner) => $crate::RowValue::new(inner)),+
                }
            }
        }
    };
}

/// An item whose payload is one variant of `P`
///
/// Carries the same envelope fields as [`TypedDatabaseItem`](super::TypedDatabaseItem).
/// It is stored by writing the active variant's payload, never the enum, so a
/// typed reader of that variant sees the same row. There is no view of it as a
/// `TypedDatabaseItem<K, P>`.
pub struct PolymorphicDatabaseItem<K, P> {
    composite_primary_key: CompositePrimaryKey<K>,
    create_date: DateTime<Utc>,
    row_status: RowStatus,
    row_value: P,
}

impl<K: PrimaryKeyAttributes, P: PossibleItemTypes> PolymorphicDatabaseItem<K, P> {
    pub fn new(composite_primary_key: CompositePrimaryKey<K>, row_value: P) -> Self {
        let now = Utc::now();
        Self {
            composite_primary_key,
            create_date: now,
            row_status: RowStatus {
                row_version: 1,
                last_updated_date: now,
            },
            row_value,
        }
    }

    pub fn from_parts(
        composite_primary_key: CompositePrimaryKey<K>,
        create_date: DateTime<Utc>,
        row_status: RowStatus,
        row_value: P,
    ) -> Self {
        Self {
            composite_primary_key,
            create_date,
            row_status,
            row_value,
        }
    }

    /// Next version of this item holding `row_value`, create date kept
    pub fn create_updated_item(&self, row_value: P) -> Self {
        Self {
            composite_primary_key: self.composite_primary_key.clone(),
            create_date: self.create_date,
            row_status: RowStatus {
                row_version: self.row_status.row_version + 1,
                last_updated_date: Utc::now(),
            },
            row_value,
        }
    }

    pub fn composite_primary_key(&self) -> &CompositePrimaryKey<K> {
        &self.composite_primary_key
    }

    pub fn create_date(&self) -> DateTime<Utc> {
        self.create_date
    }

    pub fn row_status(&self) -> RowStatus {
        self.row_status
    }

    pub fn row_value(&self) -> &P {
        &self.row_value
    }

    pub fn into_row_value(self) -> P {
        self.row_value
    }

    pub fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion {
            row_version: self.row_status.row_version,
            create_date: self.create_date,
        }
    }
}

impl<K, P: Clone> Clone for PolymorphicDatabaseItem<K, P> {
    fn clone(&self) -> Self {
        Self {
            composite_primary_key: self.composite_primary_key.clone(),
            create_date: self.create_date,
            row_status: self.row_status,
            row_value: self.row_value.clone(),
        }
    }
}

impl<K, P: fmt::Debug> fmt::Debug for PolymorphicDatabaseItem<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicDatabaseItem")
            .field("composite_primary_key", &self.composite_primary_key)
            .field("create_date", &self.create_date)
            .field("row_status", &self.row_status)
            .field("row_value", &self.row_value)
            .finish()
    }
}

impl<K, P: PartialEq> PartialEq for PolymorphicDatabaseItem<K, P> {
    fn eq(&self, other: &Self) -> bool {
        self.composite_primary_key == other.composite_primary_key
            && self.create_date == other.create_date
            && self.row_status == other.row_status
            && self.row_value == other.row_value
    }
}
