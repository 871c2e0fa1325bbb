//! Endpoint contracts: every API group hits the documented path with the
//! expected query and body, and decodes the documented payload.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use wechat_work_sdk::api::{
    AgentSettings, ApiExtension, Menu, MenuButton, User, WechatApi, WechatContext,
};
use wechat_work_sdk::store::MemoryTokenStore;
use wechat_work_sdk::token::Credential;
use wechat_work_sdk::types::{CorpId, CorpSecret};
use wechat_work_sdk::{WechatError, WechatWork};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ACCESS_TOKEN";

fn wechat_for(base_url: &str) -> WechatWork {
    let store = MemoryTokenStore::with_credential(Credential::new(
        TOKEN,
        SystemTime::now() + Duration::from_secs(3600),
    ));
    WechatWork::builder()
        .corp_id(CorpId::new("ww1234567890abcdef").unwrap())
        .secret(CorpSecret::new("secret1234567890ab").unwrap())
        .base_url(base_url)
        .token_store(Arc::new(store))
        .build()
        .unwrap()
}

fn ok(extra: serde_json::Value) -> ResponseTemplate {
    let mut body = serde_json::json!({"errcode": 0, "errmsg": "ok"});
    if let (Some(target), Some(source)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    ResponseTemplate::new(200).set_body_json(body)
}

// ============================================================
// Menu
// ============================================================

#[tokio::test]
async fn test_create_menu() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/menu/create"))
        .and(query_param("access_token", TOKEN))
        .and(query_param("agentid", "1000002"))
        .and(body_json(serde_json::json!({
            "button": [
                {"type": "click", "name": "Today", "key": "V1001_TODAY"},
                {"name": "More", "sub_button": [
                    {"type": "view", "name": "Search", "url": "http://www.soso.com/"}
                ]}
            ]
        })))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let menu = Menu::new(vec![
        MenuButton::click("Today", "V1001_TODAY"),
        MenuButton::parent(
            "More",
            vec![MenuButton::view("Search", "http://www.soso.com/")],
        ),
    ]);
    let response = wechat_for(&mock_server.uri())
        .create_menu(1000002, &menu)
        .await
        .unwrap();

    assert_eq!(response.errcode, 0);
}

#[tokio::test]
async fn test_get_and_remove_menu() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/menu/get"))
        .and(query_param("agentid", "7"))
        .respond_with(ok(serde_json::json!({
            "menu": {"button": [{"type": "click", "name": "Today", "key": "K", "sub_button": []}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/menu/delete"))
        .and(query_param("agentid", "7"))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    let menu = wechat.get_menu(7).await.unwrap();
    assert_eq!(menu.menu.button[0].key.as_deref(), Some("K"));

    wechat.remove_menu(7).await.unwrap();
}

// ============================================================
// Tag
// ============================================================

#[tokio::test]
async fn test_create_tag_returns_id() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/tag/create"))
        .and(body_json(serde_json::json!({"tagname": "UI"})))
        .respond_with(ok(serde_json::json!({"errmsg": "created", "tagid": "1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = wechat_for(&mock_server.uri())
        .create_tag("UI")
        .await
        .unwrap();
    assert_eq!(response.tagid, 1);
}

#[tokio::test]
async fn test_update_and_delete_tag() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/tag/update"))
        .and(body_json(serde_json::json!({"tagid": 1, "tagname": "UX"})))
        .respond_with(ok(serde_json::json!({"errmsg": "updated"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/tag/delete"))
        .and(query_param("tagid", "1"))
        .respond_with(ok(serde_json::json!({"errmsg": "deleted"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    assert_eq!(wechat.update_tag_name(1, "UX").await.unwrap().errmsg, "updated");
    assert_eq!(wechat.delete_tag(1).await.unwrap().errmsg, "deleted");
}

#[tokio::test]
async fn test_list_tags_and_members() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/tag/list"))
        .respond_with(ok(serde_json::json!({
            "taglist": [{"tagid": 1, "tagname": "a"}, {"tagid": 2, "tagname": "b"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/tag/get"))
        .and(query_param("tagid", "2"))
        .respond_with(ok(serde_json::json!({
            "userlist": [{"userid": "zhangsan", "name": "Li Si"}],
            "partylist": [2]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    let tags = wechat.list_tags().await.unwrap();
    assert_eq!(tags.taglist.len(), 2);
    assert_eq!(tags.taglist[1].tagname, "b");

    let members = wechat.get_tag_users(2).await.unwrap();
    assert_eq!(members.userlist[0].userid, "zhangsan");
    assert_eq!(members.partylist, vec![2]);
}

#[tokio::test]
async fn test_add_tag_users_partial_failure_is_not_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/tag/addtagusers"))
        .and(body_json(serde_json::json!({"tagid": 1, "userlist": ["id1", "ghost"]})))
        .respond_with(ok(serde_json::json!({
            "errmsg": "invalid userlist failed",
            "invalidlist": "ghost"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = wechat_for(&mock_server.uri())
        .add_tag_users(1, &["id1".to_string(), "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(response.invalid_users(), vec!["ghost"]);
}

#[tokio::test]
async fn test_delete_tag_users_all_invalid_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/tag/deltagusers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 40031,
            "errmsg": "all list invalid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = wechat_for(&mock_server.uri())
        .delete_tag_users(1, &["ghost".to_string()])
        .await
        .unwrap_err();

    match err {
        WechatError::Api { code, message } => {
            assert_eq!(code, 40031);
            assert_eq!(message, "all list invalid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================
// User
// ============================================================

#[tokio::test]
async fn test_create_and_update_user() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/user/create"))
        .and(body_json(serde_json::json!({
            "userid": "zhangsan",
            "name": "Zhang San",
            "department": [1, 2],
            "mobile": "15913215421"
        })))
        .respond_with(ok(serde_json::json!({"errmsg": "created"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/user/update"))
        .and(body_json(serde_json::json!({"userid": "zhangsan", "position": "PM"})))
        .respond_with(ok(serde_json::json!({"errmsg": "updated"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    let user = User::new("zhangsan")
        .name("Zhang San")
        .department(vec![1, 2])
        .mobile("15913215421");
    assert_eq!(wechat.create_user(&user).await.unwrap().errmsg, "created");

    let update = User::new("zhangsan").position("PM");
    assert_eq!(wechat.update_user(&update).await.unwrap().errmsg, "updated");
}

#[tokio::test]
async fn test_get_and_delete_user_encode_userid() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/get"))
        .and(query_param("userid", "li si"))
        .respond_with(ok(serde_json::json!({
            "userid": "li si",
            "name": "Li Si",
            "department": [1],
            "status": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/delete"))
        .and(query_param("userid", "li si"))
        .respond_with(ok(serde_json::json!({"errmsg": "deleted"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    let user = wechat.get_user("li si").await.unwrap();
    assert_eq!(user.status, Some(1));

    wechat.delete_user("li si").await.unwrap();
}

#[tokio::test]
async fn test_department_user_listings() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/simplelist"))
        .and(query_param("department_id", "1"))
        .and(query_param("fetch_child", "1"))
        .and(query_param("status", "0"))
        .respond_with(ok(serde_json::json!({
            "userlist": [{"userid": "zhangsan", "name": "Li Si"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/list"))
        .and(query_param("department_id", "1"))
        .and(query_param("fetch_child", "0"))
        .and(query_param("status", "4"))
        .respond_with(ok(serde_json::json!({
            "userlist": [{
                "userid": "zhangsan",
                "name": "Li Si",
                "department": [1, 2],
                "extattr": {"attrs": [{"name": "hobby", "value": "travel"}]}
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    let simple = wechat.get_department_users(1, true, 0).await.unwrap();
    assert_eq!(simple.userlist[0].name, "Li Si");

    let detail = wechat.get_department_users_detail(1, false, 4).await.unwrap();
    assert_eq!(detail.userlist[0].department, vec![1, 2]);
    assert!(detail.userlist[0].extattr.is_some());
}

#[tokio::test]
async fn test_invite_user() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/invite/send"))
        .and(body_json(serde_json::json!({"userid": "zhangsan", "invite_tips": "welcome"})))
        .respond_with(ok(serde_json::json!({"type": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = wechat_for(&mock_server.uri())
        .invite_user("zhangsan", Some("welcome"))
        .await
        .unwrap();
    assert_eq!(response.kind, 1);
}

#[tokio::test]
async fn test_get_user_id_by_code() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/getuserinfo"))
        .and(query_param("code", "CODE"))
        .and(query_param("agentid", "1000002"))
        .respond_with(ok(serde_json::json!({"UserId": "USERID", "DeviceId": "DEVICEID"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = wechat_for(&mock_server.uri())
        .get_user_id_by_code("CODE", 1000002)
        .await
        .unwrap();
    assert_eq!(response.user_id.as_deref(), Some("USERID"));
}

#[test]
fn test_authorize_url_makes_no_request() {
    let wechat = wechat_for("http://127.0.0.1:9");
    let url = wechat.authorize_url("https://example.com/cb", Some("STATE"), Some("snsapi_userinfo"));

    assert_eq!(
        url,
        "https://open.weixin.qq.com/connect/oauth2/authorize?appid=ww1234567890abcdef\
         &redirect_uri=https%3A%2F%2Fexample.com%2Fcb&response_type=code\
         &scope=snsapi_userinfo&state=STATE#wechat_redirect"
    );
}

// ============================================================
// IP and Agent
// ============================================================

#[tokio::test]
async fn test_get_callback_ip() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/getcallbackip"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ok(serde_json::json!({"ip_list": ["101.226.103.0/25"]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = wechat_for(&mock_server.uri()).get_callback_ip().await.unwrap();
    assert_eq!(response.ip_list, vec!["101.226.103.0/25"]);
}

#[tokio::test]
async fn test_agent_endpoints() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/agent/list"))
        .respond_with(ok(serde_json::json!({
            "agentlist": [{"agentid": 5, "name": "HR", "square_logo_url": "url"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/agent/get"))
        .and(query_param("agentid", "5"))
        .respond_with(ok(serde_json::json!({
            "agentid": 5,
            "name": "HR",
            "allow_partys": {"partyid": [1]},
            "close": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/agent/set"))
        .and(body_json(serde_json::json!({"agentid": 5, "description": "people"})))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = wechat_for(&mock_server.uri());
    let agents = wechat.list_agents().await.unwrap();
    assert_eq!(agents.agentlist[0].agentid, 5);

    let agent = wechat.get_agent(5).await.unwrap();
    assert_eq!(agent.close, Some(0));

    let settings = AgentSettings {
        description: Some("people".to_string()),
        ..AgentSettings::new(5)
    };
    wechat.set_agent(&settings).await.unwrap();
}

// ============================================================
// Extensions
// ============================================================

struct DepartmentApi {
    context: Arc<WechatContext>,
}

impl DepartmentApi {
    async fn list(&self) -> Result<serde_json::Value, WechatError> {
        self.context.pipeline().get_json("/cgi-bin/department/list").await
    }
}

impl WechatApi for DepartmentApi {
    fn context(&self) -> &WechatContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        Self::NAME
    }
}

impl ApiExtension for DepartmentApi {
    const NAME: &'static str = "department";

    fn from_context(context: Arc<WechatContext>) -> Self {
        Self { context }
    }
}

#[tokio::test]
async fn test_extension_shares_token_with_builtin_groups() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ok(serde_json::json!({"access_token": "T1", "expires_in": 7200})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/department/list"))
        .and(query_param("access_token", "T1"))
        .respond_with(ok(serde_json::json!({"department": [{"id": 1, "name": "HQ"}]})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/tag/list"))
        .and(query_param("access_token", "T1"))
        .respond_with(ok(serde_json::json!({"taglist": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = WechatWork::builder()
        .corp_id(CorpId::new("ww1234567890abcdef").unwrap())
        .secret(CorpSecret::new("secret1234567890ab").unwrap())
        .base_url(mock_server.uri())
        .with_extension::<DepartmentApi>()
        .build()
        .unwrap();

    let department = wechat.extension::<DepartmentApi>().unwrap();
    assert_eq!(department.api_name(), "department");

    let departments = department.list().await.unwrap();
    assert_eq!(departments["department"][0]["name"], "HQ");

    wechat.list_tags().await.unwrap();
}
