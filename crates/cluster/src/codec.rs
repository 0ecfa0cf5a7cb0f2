//! JSON wire codec for protocol records.
//!
//! Every record converts to and from `Bytes` so it can ride on any messaging
//! subject or stream as an opaque payload.

use bytes::Bytes;

use crate::command::{ReloadGatewayAck, ReloadGatewayCommand, ReloadSrcRouterAck, ReloadSrcRouterCommand};
use crate::error::Error;
use crate::migration::{
    PartitionMigration, PartitionMigrationAck, PartitionMigrationJob, PartitionMigrationJobHeader,
};

macro_rules! impl_json_codec {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl TryFrom<Bytes> for $ty {
                type Error = Error;

                fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
                    serde_json::from_slice(bytes.as_ref()).map_err(|source| Error::Decode {
                        type_name: stringify!($ty),
                        source,
                    })
                }
            }

            impl TryInto<Bytes> for $ty {
                type Error = Error;

                fn try_into(self) -> Result<Bytes, Self::Error> {
                    serde_json::to_vec(&self)
                        .map(Bytes::from)
                        .map_err(|source| Error::Encode {
                            type_name: stringify!($ty),
                            source,
                        })
                }
            }
        )+
    };
}

impl_json_codec!(
    PartitionMigration,
    PartitionMigrationJobHeader,
    PartitionMigrationJob,
    PartitionMigrationAck,
    ReloadGatewayCommand,
    ReloadGatewayAck,
    ReloadSrcRouterCommand,
    ReloadSrcRouterAck,
);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_missing_field_names_type_and_field() {
        let bytes = Bytes::from_static(br#"{"id":"m-1","status":"new","ackKeyPrefix":"ack"}"#);
        let err = PartitionMigration::try_from(bytes).unwrap_err();

        assert_matches!(err, Error::Decode { type_name: "PartitionMigration", .. });
        let message = err.to_string();
        assert!(message.contains("PartitionMigration"), "{message}");
        assert!(message.contains("`jobs`"), "{message}");
    }

    #[test]
    fn test_missing_nested_field() {
        let bytes = Bytes::from_static(
            br#"{"id":"m-1","status":"new","ackKeyPrefix":"ack","jobs":[{"jobId":"j","sourceNode":0,"partitions":["p"]}]}"#,
        );
        let err = PartitionMigration::try_from(bytes).unwrap_err();
        assert!(err.to_string().contains("`targetNode`"), "{err}");
    }

    #[test]
    fn test_malformed_json() {
        let err = ReloadGatewayCommand::try_from(Bytes::from_static(b"{not json")).unwrap_err();
        assert_matches!(err, Error::Decode { type_name: "ReloadGatewayCommand", .. });
    }

    #[test]
    fn test_ack_bytes_shape() {
        let ack = ReloadSrcRouterAck {
            node_name: "node-0".to_string(),
        };
        let bytes: Bytes = ack.try_into().unwrap();
        assert_eq!(bytes.as_ref(), br#"{"nodeName":"node-0"}"#);
    }
}
