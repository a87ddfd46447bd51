//! Macros for reducing boilerplate when defining console records
//!
//! Every record carries an optional server-assigned `id` and a `status`;
//! aggregates additionally own association lists of tagged target records.

/// Define a record struct and implement [`Record`](crate::core::record::Record) for it
///
/// Scalar fields are exposed to search and validation under their Rust name.
/// Association fields hold `Vec<AssociationRecord<Target>>` and are settled
/// by key on save.
///
/// # Example
///
/// ```rust,ignore
/// impl_record!(
///     Role,
///     "role",
///     "roles",
///     {
///         name: String,
///         description: Option<String>,
///     },
///     associations {
///         privileges: Privilege,
///     }
/// );
///
/// let role = Role::new("ADMIN".to_string(), None);
/// assert_eq!(role.status, "active");
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $singular:expr,
        $plural:expr,
        {
            $( $field:ident : $field_type:ty ),* $(,)?
        }
        $(, associations {
            $( $assoc:ident : $target:ty ),* $(,)?
        } )?
        $(,)?
    ) => {
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Server-assigned identifier, absent until first save
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub id: Option<::uuid::Uuid>,

            /// Current status of the record
            #[serde(default)]
            pub status: String,

            $(
                #[serde(default)]
                pub $field : $field_type,
            )*

            $( $(
                #[serde(default)]
                pub $assoc: Vec<$crate::core::association::AssociationRecord<$target>>,
            )* )?
        }

        impl $crate::core::record::Record for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> Option<::uuid::Uuid> {
                self.id
            }

            fn set_id(&mut self, id: Option<::uuid::Uuid>) {
                self.id = id;
            }

            fn status(&self) -> &str {
                &self.status
            }

            fn set_status(&mut self, status: &str) {
                self.status = status.to_string();
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    "id" => Some(self.id.into()),
                    "status" => Some(self.status.clone().into()),
                    $( stringify!($field) => Some(self.$field.clone().into()), )*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn settle(&mut self, previous: Option<&Self>) {
                $( $(
                    self.$assoc = $crate::core::association::settle_associations(
                        previous.map(|p| p.$assoc.as_slice()).unwrap_or_default(),
                        &self.$assoc,
                        $crate::core::record::record_key::<$target>,
                    );
                )* )?
            }

            fn prepare_duplicate(&mut self) {
                self.id = None;
                $( $(
                    $crate::core::association::retag_for_copy(&mut self.$assoc);
                )* )?
            }
        }

        impl $type {
            /// Create an unsaved, active record with no associations
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $field_type ),*) -> Self {
                Self {
                    status: "active".to_string(),
                    $( $field, )*
                    ..Self::default()
                }
            }

            /// Same record with a server-assigned id
            pub fn with_id(mut self, id: ::uuid::Uuid) -> Self {
                self.id = Some(id);
                self
            }
        }
    };
}
