//! Record declarations.
//!
//! [`bindable!`](crate::bindable) describes a struct's bindable fields once:
//! the per-source tags of each field, embedded records, and fields the
//! engine must leave alone. It generates the [`Record`](crate::Record) and
//! [`Bindable`](crate::Bindable) implementations the engine walks.

/// Declares a struct as a bindable record.
///
/// Each entry names a field, optionally followed by its source tags.
/// Tag names are the configured source tags (`param`, `query`, `header`,
/// `form` by default). `#[embedded]` marks an embedded record whose fields
/// are bound as if they were declared on the parent; `#[skip]` describes a
/// field the engine must never assign. Untagged record fields are recursed
/// into with the parent's keys.
///
/// A leading `#[serde]` lets JSON and XML bodies decode into the record
/// through its `Serialize` and `DeserializeOwned` implementations. Without
/// it, structured bodies are rejected as an unsupported media type.
///
/// # Examples
///
/// ```
/// use request_binder::{bindable, Binder, BindingSource, ValueMap, FileMap};
///
/// #[derive(Debug, Default)]
/// struct Paging {
///     page: u32,
/// }
///
/// bindable! {
///     Paging {
///         page(query = "page"),
///     }
/// }
///
/// #[derive(Debug, Default)]
/// struct Search {
///     term: String,
///     limit: Option<u16>,
///     paging: Paging,
/// }
///
/// bindable! {
///     Search {
///         term(query = "q", form = "q"),
///         limit(query = "limit"),
///         paging,
///     }
/// }
///
/// let mut query = ValueMap::new();
/// query.insert("q".into(), vec!["rust".into()]);
/// query.insert("page".into(), vec!["3".into()]);
///
/// let mut search = Search::default();
/// Binder::default()
///     .bind_values(&mut search, BindingSource::Query, &query, &FileMap::new())
///     .unwrap();
///
/// assert_eq!(search.term, "rust");
/// assert_eq!(search.limit, None);
/// assert_eq!(search.paging.page, 3);
/// ```
#[macro_export]
macro_rules! bindable {
    (
        $(#[$flag:ident])?
        $ty:ty {
            $(
                $(#[$attr:ident])?
                $field:ident $( ( $( $tag:ident = $key:literal ),* $(,)? ) )?
            ),* $(,)?
        }
    ) => {
        impl $crate::Record for $ty {
            fn fields(&self) -> &'static [$crate::Field] {
                const FIELDS: &[$crate::Field] = &[
                    $(
                        $crate::__field_descriptor!(
                            $(#[$attr])?
                            stringify!($field),
                            &[ $( $( (stringify!($tag), $key) ),* )? ]
                        )
                    ),*
                ];
                FIELDS
            }

            fn field_mut(&mut self, field: &$crate::Field) -> Option<$crate::Slot<'_>> {
                $(
                    if field.name == stringify!($field) {
                        return $crate::__field_slot!($(#[$attr])? &mut self.$field);
                    }
                )*
                None
            }
        }

        impl $crate::Bindable for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Record
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Record(self)
            }

            fn body_target(&mut self) -> Option<&mut dyn $crate::BodyTarget> {
                $crate::__body_target!($(#[$flag])? self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __body_target {
    (#[serde] $this:expr) => {
        Some($this as &mut dyn $crate::BodyTarget)
    };
    ($this:expr) => {
        None
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_descriptor {
    (#[embedded] $name:expr, $tags:expr) => {
        $crate::Field::embedded($name, $tags)
    };
    (#[skip] $name:expr, $tags:expr) => {
        $crate::Field::new($name, $tags)
    };
    ($name:expr, $tags:expr) => {
        $crate::Field::new($name, $tags)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_slot {
    (#[skip] $place:expr) => {
        None
    };
    (#[embedded] $place:expr) => {
        Some($crate::Bindable::slot($place))
    };
    ($place:expr) => {
        Some($crate::Bindable::slot($place))
    };
}
