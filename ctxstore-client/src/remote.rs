use ctxstore_rpc::{
    RpcChannel, RpcResult, StorageGet, StorageGetRequest, StorageRemove, StorageRemoveRequest,
    StorageSet, StorageSetRequest,
};
use serde_json::Value;

/// Reads and writes the canonical store from a non-privileged context.
///
/// Each call is one request to the privileged context. Rejections come back
/// unchanged.
#[derive(Clone)]
pub struct RemoteStore {
    channel: RpcChannel,
}

impl RemoteStore {
    pub fn new(channel: RpcChannel) -> Self {
        Self { channel }
    }

    pub async fn get(&self, key: &str) -> RpcResult<Option<Value>> {
        self.channel
            .request::<StorageGet>(StorageGetRequest {
                key: key.to_string(),
            })
            .await
    }

    pub async fn set(&self, key: &str, value: Value) -> RpcResult<()> {
        self.channel
            .request::<StorageSet>(StorageSetRequest {
                key: key.to_string(),
                value,
            })
            .await
    }

    pub async fn remove(&self, key: &str) -> RpcResult<()> {
        self.channel
            .request::<StorageRemove>(StorageRemoveRequest {
                key: key.to_string(),
            })
            .await
    }
}
