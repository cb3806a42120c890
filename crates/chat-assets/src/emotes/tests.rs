use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::cache::ExpiringCache;
use crate::config::ChatAssetsConfig;
use crate::http::HttpFetch;
use crate::testing::FakeFetcher;

fn test_config() -> ChatAssetsConfig {
    ChatAssetsConfig {
        ffz_base: "https://ffz.test/v1".into(),
        bttv_base: "https://bttv.test/3/cached".into(),
        seventv_base: "https://7tv.test/v2".into(),
        ..Default::default()
    }
}

struct Fixture {
    fetcher: Arc<FakeFetcher>,
    ffz: FfzProvider,
    bttv: BttvProvider,
    seventv: SevenTvProvider,
}

fn fixture() -> Fixture {
    let config = test_config();
    let cache = ExpiringCache::new(config.default_ttl);
    let fetcher = FakeFetcher::new();
    let http: Arc<dyn HttpFetch> = fetcher.clone();
    Fixture {
        ffz: FfzProvider::new(&config, cache.clone(), http.clone()),
        bttv: BttvProvider::new(&config, cache.clone(), http.clone()),
        seventv: SevenTvProvider::new(&config, cache, http),
        fetcher,
    }
}

fn channel() -> ChannelIdentity {
    ChannelIdentity::new("12345", "somestreamer")
}

fn ffz_emote(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "width": 28,
        "height": 21,
        "urls": {
            "1": format!("//cdn.frankerfacez.com/emote/{id}/1"),
            "2": format!("//cdn.frankerfacez.com/emote/{id}/2"),
            "4": format!("https://cdn.frankerfacez.com/emote/{id}/4"),
        }
    })
}

fn seventv_emote(id: &str, name: &str, zero_width: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "visibility_simple": if zero_width { json!(["ZERO_WIDTH"]) } else { json!([]) },
        "width": [32, 64, 96, 128],
        "height": [24, 48, 72, 96],
        "urls": [
            ["1", format!("https://cdn.7tv.app/emote/{id}/1x")],
            ["2", format!("https://cdn.7tv.app/emote/{id}/2x")],
            ["3", format!("https://cdn.7tv.app/emote/{id}/3x")],
            ["4", format!("https://cdn.7tv.app/emote/{id}/4x")]
        ]
    })
}

#[test]
fn emote_urls_require_one_tier() {
    assert!(EmoteUrls::new([None, None, None]).is_none());

    let urls = EmoteUrls::new([None, Some("b".into()), Some("c".into())]).unwrap();
    assert_eq!(urls.smallest(), "b");
    assert_eq!(urls.largest(), "c");
    assert_eq!(urls.tier(0), None);
    assert_eq!(urls.tier(3), None);
}

#[test]
fn emote_serializes_for_renderer() {
    let emote = Emote {
        id: "1".into(),
        code: "Kappa".into(),
        provider: Provider::SevenTv,
        urls: EmoteUrls::new([Some("a".into()), None, None]).unwrap(),
        width: Some(28),
        height: None,
        is_zero_width: true,
    };
    let value = serde_json::to_value(&emote).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "1",
            "code": "Kappa",
            "provider": "7tv",
            "url": ["a", null, null],
            "width": 28,
            "isZeroWidth": true,
        })
    );

    let back: Emote = serde_json::from_value(value).unwrap();
    assert_eq!(back, emote);
    assert!(serde_json::from_value::<EmoteUrls>(json!([null, null, null])).is_err());
}

#[test]
fn ffz_conversion_picks_scales_and_absolutizes() {
    let raw: ffz::FfzEmote = serde_json::from_value(json!({
        "id": 25927,
        "name": "CatBag",
        "width": 32,
        "height": 32,
        "urls": { "1": "//cdn.frankerfacez.com/emote/25927/1", "2": null, "4": "//cdn.frankerfacez.com/emote/25927/4" }
    }))
    .unwrap();
    let emote = ffz::convert_emote(raw).unwrap();

    assert_eq!(emote.id, "25927");
    assert_eq!(emote.code, "CatBag");
    assert_eq!(emote.provider, Provider::Ffz);
    assert_eq!(
        emote.urls.as_array(),
        &[
            Some("https://cdn.frankerfacez.com/emote/25927/1".to_string()),
            None,
            Some("https://cdn.frankerfacez.com/emote/25927/4".to_string()),
        ]
    );
    assert_eq!(emote.width, Some(32));
}

#[test]
fn bttv_conversion_builds_cdn_tiers() {
    let raw: bttv::BttvEmote =
        serde_json::from_value(json!({ "id": "abc", "code": "monkaS", "imageType": "png" })).unwrap();
    let emote = bttv::convert_emote(raw).unwrap();
    assert_eq!(emote.urls.tier(0), Some("https://cdn.betterttv.net/emote/abc/1x"));
    assert_eq!(emote.urls.tier(2), Some("https://cdn.betterttv.net/emote/abc/3x"));
    assert_eq!(emote.width, None);
}

#[test]
fn seventv_conversion_reads_zero_width_and_first_tiers() {
    let raw: seventv::SevenTvEmote =
        serde_json::from_value(seventv_emote("60ae", "RainTime", true)).unwrap();
    let emote = seventv::convert_emote(raw).unwrap();
    assert!(emote.is_zero_width);
    assert_eq!(emote.width, Some(32));
    assert_eq!(emote.height, Some(24));
    assert_eq!(emote.urls.largest(), "https://cdn.7tv.app/emote/60ae/3x");

    let mut plain = seventv_emote("60af", "Plain", false);
    plain["visibility_simple"] = serde_json::Value::Null;
    let raw: seventv::SevenTvEmote = serde_json::from_value(plain).unwrap();
    assert!(!seventv::convert_emote(raw).unwrap().is_zero_width);
}

#[tokio::test]
async fn ffz_global_flattens_default_sets() {
    let f = fixture();
    f.fetcher.ok(
        "https://ffz.test/v1/set/global",
        json!({
            "default_sets": [3, 4330],
            "sets": {
                "3": { "id": 3, "emoticons": [ffz_emote(1, "A"), ffz_emote(2, "B")] },
                "4330": { "id": 4330, "emoticons": [ffz_emote(3, "C")] },
                "999": { "id": 999, "emoticons": [ffz_emote(4, "Hidden")] }
            },
            "users": {}
        }),
    );

    let emotes = f.ffz.load_global().await.unwrap();
    let codes: Vec<_> = emotes.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, ["A", "B", "C"]);
}

#[tokio::test]
async fn ffz_global_repeats_a_set_listed_twice() {
    let f = fixture();
    f.fetcher.ok(
        "https://ffz.test/v1/set/global",
        json!({
            "default_sets": [3, 3],
            "sets": { "3": { "id": 3, "emoticons": [ffz_emote(1, "A")] } }
        }),
    );

    let emotes = f.ffz.load_global().await.unwrap();
    let codes: Vec<_> = emotes.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, ["A", "A"]);
}

#[tokio::test]
async fn ffz_channel_reads_room_set() {
    let f = fixture();
    f.fetcher.ok(
        "https://ffz.test/v1/room/id/12345",
        json!({
            "room": { "_id": 1, "twitch_id": 12345, "id": "somestreamer", "set": 77 },
            "sets": { "77": { "id": 77, "emoticons": [ffz_emote(10, "Room")] } }
        }),
    );

    let emotes = f.ffz.load_for_channel(&channel()).await.unwrap();
    assert_eq!(emotes.len(), 1);
    assert_eq!(emotes[0].code, "Room");
    assert_eq!(emotes[0].height, Some(21));
}

#[tokio::test]
async fn ffz_user_lookup() {
    let f = fixture();
    f.fetcher.ok(
        "https://ffz.test/v1/_user/somestreamer",
        json!({ "user": { "id": 9, "twitch_id": 12345, "name": "somestreamer", "display_name": "SomeStreamer", "emote_sets": [77] } }),
    );
    f.fetcher.respond(
        "https://ffz.test/v1/_user/nobody",
        404,
        json!({ "error": "Not Found", "status": 404, "message": "No such user" }),
    );

    let user = f.ffz.get_user_from_login("somestreamer").await.unwrap().unwrap();
    assert_eq!(user.twitch_id, Some(12345));
    assert_eq!(user.emote_sets, [77]);
    assert!(f.ffz.get_user_from_login("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn bttv_channel_concatenates_channel_then_shared() {
    let f = fixture();
    f.fetcher.ok(
        "https://bttv.test/3/cached/users/twitch/12345",
        json!({
            "id": "x",
            "bots": [],
            "avatar": "",
            "channelEmotes": [{ "id": "c1", "code": "Own", "imageType": "png", "userId": "u" }],
            "sharedEmotes": [{ "id": "s1", "code": "Shared", "imageType": "gif", "user": { "id": "u2", "name": "n", "displayName": "N", "providerId": "1" } }]
        }),
    );

    let emotes = f.bttv.load_for_channel(&channel()).await.unwrap();
    let codes: Vec<_> = emotes.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, ["Own", "Shared"]);
    assert!(emotes.iter().all(|e| e.provider == Provider::Bttv));
}

#[tokio::test]
async fn seventv_sends_platform_headers_and_uses_login() {
    let f = fixture();
    let url = "https://7tv.test/v2/users/somestreamer/emotes";
    f.fetcher.ok(url, json!([seventv_emote("a", "A", false)]));

    let emotes = f.seventv.load_for_channel(&channel()).await.unwrap();
    assert_eq!(emotes.len(), 1);

    let request = f.fetcher.last_request(url).unwrap();
    assert!(request
        .headers
        .contains(&("X-SevenTV-Platform", "an-alca-chat-client".to_string())));
    assert!(request
        .headers
        .contains(&("X-SevenTV-Version", "2.0.0".to_string())));
}

#[tokio::test]
async fn error_envelopes_degrade_to_empty_lists() {
    let f = fixture();
    f.fetcher.respond(
        "https://ffz.test/v1/room/id/12345",
        404,
        json!({ "error": "Not Found", "status": 404, "message": "No such room" }),
    );
    f.fetcher.respond(
        "https://ffz.test/v1/set/global",
        500,
        json!({ "error": "Internal Server Error", "status": 500 }),
    );
    f.fetcher.respond(
        "https://bttv.test/3/cached/users/twitch/12345",
        404,
        json!({ "message": "user not found" }),
    );
    f.fetcher.ok(
        "https://bttv.test/3/cached/emotes/global",
        json!({ "message": "maintenance" }),
    );
    f.fetcher.respond(
        "https://7tv.test/v2/users/somestreamer/emotes",
        404,
        json!({ "error": "Unknown User", "error_code": 70442, "status": "Not Found", "status_code": 404 }),
    );
    f.fetcher.respond(
        "https://7tv.test/v2/emotes/global",
        503,
        json!({ "error": "Service Unavailable" }),
    );

    let ch = channel();
    assert!(f.ffz.load_for_channel(&ch).await.unwrap().is_empty());
    assert!(f.ffz.load_global().await.unwrap().is_empty());
    assert!(f.bttv.load_for_channel(&ch).await.unwrap().is_empty());
    assert!(f.bttv.load_global().await.unwrap().is_empty());
    assert!(f.seventv.load_for_channel(&ch).await.unwrap().is_empty());
    assert!(f.seventv.load_global().await.unwrap().is_empty());
}

#[tokio::test]
async fn unrecognized_payloads_are_errors() {
    let f = fixture();
    f.fetcher.ok("https://bttv.test/3/cached/emotes/global", json!({ "surprise": true }));
    f.fetcher.respond("https://7tv.test/v2/emotes/global", 502, json!("bad gateway"));

    assert!(matches!(
        f.bttv.load_global().await,
        Err(AssetError::Decode { provider: "bttv", .. })
    ));
    assert!(matches!(
        f.seventv.load_global().await,
        Err(AssetError::ApiError { status: 502, .. })
    ));
}

#[tokio::test]
async fn transport_failures_propagate() {
    let f = fixture();
    f.fetcher.fail(
        "https://ffz.test/v1/set/global",
        AssetError::ApiError {
            status: 503,
            message: "connection reset".into(),
        },
    );
    assert!(f.ffz.load_global().await.is_err());
}

#[tokio::test]
async fn raw_responses_are_cached_per_url() {
    let f = fixture();
    let url = "https://bttv.test/3/cached/emotes/global";
    f.fetcher.ok(url, json!([{ "id": "g1", "code": "Global" }]));

    let first = f.bttv.load_global().await.unwrap();
    let second = f.bttv.load_global().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(f.fetcher.hits(url), 1);
}
