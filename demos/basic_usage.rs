//! Basic usage example for wechat-work-sdk
//!
//! Run with: cargo run --example basic_usage

use wechat_work_sdk::{
    api::{Menu, MenuButton},
    types::{CorpId, CorpSecret},
    WechatWork,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let wechat = WechatWork::builder()
        .corp_id(CorpId::new("ww1234567890abcdef")?)
        .secret(CorpSecret::new("your_corp_secret_here")?)
        .build()?;

    println!("Client created for corp {}", wechat.corp_id());

    match wechat.list_tags().await {
        Ok(response) => {
            for tag in response.taglist {
                println!("tag {}: {}", tag.tagid, tag.tagname);
            }
        }
        Err(error) => eprintln!("list_tags failed: {error}"),
    }

    let menu = Menu::new(vec![
        MenuButton::click("Today", "V1001_TODAY"),
        MenuButton::view("Portal", "https://example.com/"),
    ]);
    if let Err(error) = wechat.create_menu(1000002, &menu).await {
        eprintln!("create_menu failed: {error}");
    }

    println!(
        "OAuth URL: {}",
        wechat.authorize_url("https://example.com/oauth/callback", Some("state"), None)
    );

    Ok(())
}
