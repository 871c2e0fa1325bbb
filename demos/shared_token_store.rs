//! Share one access token between processes through a file.
//!
//! Run with: cargo run --example shared_token_store
//!
//! The first process (with the corp secret) refreshes and writes the token;
//! other processes built without a secret only read it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use wechat_work_sdk::{
    store::TokenStore,
    token::Credential,
    types::{CorpId, CorpSecret},
    WechatError, WechatWork,
};

struct FileTokenStore {
    path: PathBuf,
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Credential>, WechatError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WechatError::Store(e.to_string())),
        }
    }

    async fn save(&self, credential: Option<Credential>) -> Result<(), WechatError> {
        let result = match credential {
            Some(credential) => {
                let bytes = serde_json::to_vec(&credential)?;
                tokio::fs::write(&self.path, bytes).await
            }
            None => match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        result.map_err(|e| WechatError::Store(e.to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileTokenStore {
        path: std::env::temp_dir().join("wechat_work_access_token.json"),
    });

    let owner = WechatWork::builder()
        .corp_id(CorpId::new("ww1234567890abcdef")?)
        .secret(CorpSecret::new("your_corp_secret_here")?)
        .token_store(store.clone())
        .build()?;

    let consumer = WechatWork::builder()
        .corp_id(CorpId::new("ww1234567890abcdef")?)
        .token_store(store)
        .build()?;

    match owner.get_callback_ip().await {
        Ok(response) => println!("callback ips: {:?}", response.ip_list),
        Err(error) => eprintln!("owner call failed: {error}"),
    }

    match consumer.get_access_token().await {
        Ok(_) => println!("consumer reused the owner's token"),
        Err(error) => eprintln!("consumer has no token yet: {error}"),
    }

    Ok(())
}
