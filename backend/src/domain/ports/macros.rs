//! `define_port_error!`: error enums for outbound ports.
//!
//! Each variant gets a thiserror message and a snake_case constructor whose
//! parameters accept anything convertible into the field types, so adapters
//! can write `CacheError::backend("redis down")`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),* },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum StoreError {
            Unavailable { message: String } => "store unavailable: {message}",
            Rejected { key: String, size: usize } => "rejected {key} ({size} bytes)",
        }
    }

    #[rstest]
    fn constructors_convert_arguments() {
        assert_eq!(
            StoreError::unavailable("offline").to_string(),
            "store unavailable: offline"
        );
    }

    #[rstest]
    fn constructors_keep_typed_fields() {
        let err = StoreError::rejected("users:index", 42_usize);
        assert_eq!(
            err,
            StoreError::Rejected {
                key: "users:index".to_owned(),
                size: 42
            }
        );
        assert_eq!(err.to_string(), "rejected users:index (42 bytes)");
    }
}
