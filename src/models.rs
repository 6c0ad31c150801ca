//! Shared model plumbing: the record and list macros plus the embedded
//! references and event vocabulary used by several services.

use serde::{Deserialize, Serialize};

use crate::stringify::impl_display;

/// Declares a wire record whose fields are all optional. Absent fields are
/// left out of the JSON payload and stay `None` when the server omits them.
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        $crate::stringify::impl_display!($name);
    };
}

/// Declares a list response: the named item array next to the flattened
/// pagination envelope. It serializes as a struct named after the list so
/// stringify keeps the type name; the JSON stays flat.
macro_rules! list {
    (
        $(#[$meta:meta])*
        pub struct $name:ident { $field:ident : $item:ty }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
        pub struct $name {
            #[serde(default)]
            pub $field: Vec<$item>,
            #[serde(flatten)]
            pub pagination: $crate::pagination::Pagination,
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                use serde::ser::SerializeStruct;

                let mut state = serializer.serialize_struct(
                    stringify!($name),
                    1 + $crate::pagination::Pagination::FIELD_COUNT,
                )?;
                state.serialize_field(stringify!($field), &self.$field)?;
                self.pagination.serialize_fields(&mut state)?;
                state.end()
            }
        }

        $crate::stringify::impl_display!($name);
    };
}

pub(crate) use list;
pub(crate) use record;

record! {
    /// Read-only projection of a client embedded in other resources.
    pub struct ClientRef {
        id: i64,
        name: String,
        currency: String,
    }
}

record! {
    pub struct ProjectRef {
        id: i64,
        name: String,
        code: String,
    }
}

record! {
    pub struct TaskRef {
        id: i64,
        name: String,
    }
}

record! {
    pub struct UserRef {
        id: i64,
        name: String,
    }
}

record! {
    pub struct InvoiceRef {
        id: i64,
        number: String,
    }
}

record! {
    pub struct EstimateRef {
        id: i64,
        number: String,
    }
}

record! {
    pub struct MessageRecipient {
        name: String,
        email: String,
    }
}

/// Workflow transitions posted to estimate and invoice message endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Send,
    Accept,
    Decline,
    #[serde(rename = "re-open")]
    ReOpen,
    Close,
    Draft,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Send => "send",
            EventType::Accept => "accept",
            EventType::Decline => "decline",
            EventType::ReOpen => "re-open",
            EventType::Close => "close",
            EventType::Draft => "draft",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a workflow transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub event_type: EventType,
}

impl_display!(EventRequest);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_use_wire_names() {
        let names = [
            EventType::Send,
            EventType::Accept,
            EventType::Decline,
            EventType::ReOpen,
            EventType::Close,
            EventType::Draft,
        ]
        .map(|event| serde_json::to_value(event).unwrap());
        assert_eq!(
            names.to_vec(),
            ["send", "accept", "decline", "re-open", "close", "draft"]
                .map(serde_json::Value::from)
                .to_vec()
        );
        assert_eq!(EventType::ReOpen.to_string(), "re-open");
    }

    #[test]
    fn event_request_body() {
        let body = serde_json::to_string(&EventRequest {
            event_type: EventType::Accept,
        })
        .unwrap();
        assert_eq!(body, r#"{"event_type":"accept"}"#);
    }

    #[test]
    fn embedded_reference_skips_absent_fields() {
        let client = ClientRef {
            id: Some(5735776),
            name: Some("123 Industries".to_string()),
            currency: None,
        };
        assert_eq!(
            serde_json::to_string(&client).unwrap(),
            r#"{"id":5735776,"name":"123 Industries"}"#
        );
        assert_eq!(client.to_string(), r#"ClientRef{id:5735776, name:"123 Industries"}"#);
    }
}
