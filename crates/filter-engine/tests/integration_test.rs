//! 过滤引擎集成测试
//!
//! 使用真实形状的通知与媒体数据，测试从 YAML 规则加载到目标解析的完整流程。

use filter_engine::{
    FilterResolver, MatchOutcome, NotificationEvent, Rule, RuleSetValidator, Target,
};
use serde_json::{Value, json};

/// 电影请求通知
fn movie_webhook() -> NotificationEvent {
    serde_json::from_value(json!({
        "notification_type": "MEDIA_AUTO_APPROVED",
        "media": {
            "media_type": "movie",
            "tmdbId": "558449",
            "tvdbId": "",
            "status": "PENDING",
            "status4k": "UNKNOWN"
        },
        "request": {
            "request_id": "12",
            "requestedBy_email": "email@email.com",
            "requestedBy_username": "user2",
            "requestedBy_avatar": ""
        },
        "extra": []
    }))
    .unwrap()
}

/// 剧集请求通知
fn show_webhook() -> NotificationEvent {
    serde_json::from_value(json!({
        "notification_type": "MEDIA_AUTO_APPROVED",
        "media": {
            "media_type": "tv",
            "tmdbId": "94605",
            "tvdbId": "371028",
            "status": "PENDING",
            "status4k": "UNKNOWN"
        },
        "request": {
            "request_id": "13",
            "requestedBy_email": "email@email.com",
            "requestedBy_username": "user2"
        },
        "extra": [{"name": "Requested Seasons", "value": "1, 2"}]
    }))
    .unwrap()
}

/// Gladiator II 的元数据（节选）
fn gladiator_data() -> Value {
    json!({
        "id": 558449,
        "adult": false,
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 12, "name": "Adventure"}
        ],
        "originalLanguage": "en",
        "originalTitle": "Gladiator II",
        "productionCompanies": [
            {"id": 4, "name": "Paramount Pictures", "originCountry": "US"},
            {"id": 221347, "name": "Scott Free Productions", "originCountry": "US"}
        ],
        "productionCountries": [{"iso_3166_1": "US", "name": "United States of America"}],
        "releaseDate": "2024-11-13",
        "voteAverage": 7.315,
        "collection": {"id": 1069584, "name": "Gladiator Collection"},
        "mediaInfo": {"tvdbId": null, "status": 3, "seasons": []},
        "keywords": [
            {"id": 6917, "name": "epic"},
            {"id": 1394, "name": "gladiator"},
            {"id": 1405, "name": "roman empire"},
            {"id": 5049, "name": "ancient rome"},
            {"id": 9663, "name": "sequel"}
        ]
    })
}

/// Arcane 的元数据（节选）
fn arcane_data() -> Value {
    json!({
        "id": 94605,
        "name": "Arcane",
        "originalName": "Arcane",
        "originalLanguage": "en",
        "genres": [
            {"id": 16, "name": "Animation"},
            {"id": 10765, "name": "Sci-Fi & Fantasy"},
            {"id": 10759, "name": "Action & Adventure"}
        ],
        "languages": ["en"],
        "networks": [{"id": 213, "name": "Netflix", "originCountry": ""}],
        "contentRatings": {
            "results": [
                {"iso_3166_1": "US", "rating": "TV-14"},
                {"iso_3166_1": "DE", "rating": "16"}
            ]
        },
        "keywords": [
            {"id": 2343, "name": "magic"},
            {"id": 6075, "name": "sports"},
            {"id": 9715, "name": "superhero"},
            {"id": 210024, "name": "anime"}
        ]
    })
}

fn load_rules(yaml: &str) -> Vec<Rule> {
    let rules: Vec<Rule> = serde_yaml::from_str(yaml).unwrap();
    RuleSetValidator::validate(&rules).unwrap();
    rules
}

fn target(name: &str) -> Option<Target> {
    Some(Target::One(name.to_string()))
}

// ==================== 典型场景 ====================

#[test]
fn test_genre_with_keyword_exclude() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    genres: Action
    keywords:
      exclude: anime
  apply: A
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("A"));
}

#[test]
fn test_excluded_keyword_present() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    genres: Action
    keywords:
      exclude: anime
  apply: A
"#,
    );

    let mut data = gladiator_data();
    data["keywords"] = json!([{"id": 210024, "name": "anime"}, {"id": 6917, "name": "epic"}]);

    let outcome = FilterResolver::resolve(&movie_webhook(), &data, &rules);
    assert!(matches!(outcome, MatchOutcome::NoMatch));
}

#[test]
fn test_keyword_require_single_value() {
    let rules = load_rules(
        r#"
- media_type: tv
  conditions:
    keywords:
      require: [magic]
  apply: B
"#,
    );

    let outcome = FilterResolver::resolve(&show_webhook(), &arcane_data(), &rules);
    assert_eq!(outcome.into_target(), target("B"));
}

#[test]
fn test_content_rating_literal() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    contentRatings: "16"
  apply: C
"#,
    );

    let mut data = gladiator_data();
    data["contentRatings"] = json!({"results": [{"iso_3166_1": "DE", "rating": "16"}]});

    let outcome = FilterResolver::resolve(&movie_webhook(), &data, &rules);
    assert_eq!(outcome.into_target(), target("C"));
}

#[test]
fn test_first_listed_rule_wins() {
    let yaml = r#"
- media_type: movie
  conditions:
    originalLanguage: en
  apply: first
- media_type: movie
  conditions:
    originalLanguage: en
  apply: second
"#;
    let mut rules = load_rules(yaml);

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("first"));

    rules.reverse();
    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("second"));
}

#[test]
fn test_missing_field_fails_closed() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    originalLanguage: en
  apply: radarr
"#,
    );

    let mut data = gladiator_data();
    data.as_object_mut().unwrap().remove("originalLanguage");

    let outcome = FilterResolver::resolve(&movie_webhook(), &data, &rules);
    assert!(matches!(outcome, MatchOutcome::NoMatch));
    assert_eq!(outcome.into_target(), None);
}

// ==================== 匹配语义 ====================

#[test]
fn test_require_is_universal_include_is_existential() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    genres:
      require: [Action, Drama]
  apply: require
- media_type: movie
  conditions:
    genres:
      include: [Action, Drama]
  apply: include
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("include"));
}

#[test]
fn test_require_against_nested_object() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    collection:
      require: gladiator collection
  apply: collections
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("collections"));
}

#[test]
fn test_include_matches_inside_records() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    productionCompanies: paramount
  apply: paramount
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("paramount"));
}

#[test]
fn test_exclude_on_generic_field() {
    let rules = load_rules(
        r#"
- media_type: tv
  conditions:
    genres:
      exclude: animation
  apply: live-action
- media_type: tv
  apply: sonarr
"#,
    );

    let outcome = FilterResolver::resolve(&show_webhook(), &arcane_data(), &rules);
    assert_eq!(outcome.into_target(), target("sonarr"));
}

#[test]
fn test_all_fields_must_pass() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    keywords: epic
    genres: [Adventure, Drama]
    originalLanguage: pl
  apply: radarr2
- media_type: movie
  conditions:
    originalLanguage: en
    genres: Action
    keywords:
      exclude: anime
  apply: radarr
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("radarr"));
}

#[test]
fn test_keywords_with_all_modifiers() {
    let rules = load_rules(
        r#"
- media_type: movie
  conditions:
    keywords:
      require: epic
      include: rome
      exclude: [horror, anime]
  apply: historical
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("historical"));
}

#[test]
fn test_request_metadata_condition() {
    let rules = load_rules(
        r#"
- media_type: tv
  conditions:
    requestedBy_username: user2
    max_seasons: 2
  apply: [sonarr, sonarr-archive]
"#,
    );

    let outcome = FilterResolver::resolve(&show_webhook(), &arcane_data(), &rules);
    assert_eq!(
        outcome.into_target(),
        Some(Target::Many(vec![
            "sonarr".to_string(),
            "sonarr-archive".to_string()
        ]))
    );
}

#[test]
fn test_season_limit_exceeded() {
    let rules = load_rules(
        r#"
- media_type: tv
  conditions:
    max_seasons: 1
  apply: sonarr-small
"#,
    );

    let outcome = FilterResolver::resolve(&show_webhook(), &arcane_data(), &rules);
    assert!(matches!(outcome, MatchOutcome::NoMatch));
}

#[test]
fn test_4k_rule_skipped_for_regular_request() {
    let rules = load_rules(
        r#"
- media_type: movie
  is_4k: true
  apply: radarr4k
- media_type: movie
  is_4k: false
  apply: radarr
"#,
    );

    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &rules);
    assert_eq!(outcome.into_target(), target("radarr"));
}

#[test]
fn test_malformed_metadata_degrades_to_no_target() {
    let rules = load_rules(
        r#"
- media_type: tv
  conditions:
    contentRatings: "16"
  apply: sonarr
"#,
    );

    let mut data = arcane_data();
    data["contentRatings"] = json!({"results": "TV-14"});

    let outcome = FilterResolver::resolve(&show_webhook(), &data, &rules);
    assert_eq!(outcome.label(), "fault");
    assert_eq!(outcome.into_target(), None);
}

#[test]
fn test_resolution_is_deterministic() {
    let rules = load_rules(
        r#"
- media_type: tv
  conditions:
    genres: [Sci-Fi & Fantasy, Animation]
    keywords: [power, magic]
  apply: sonarr-anime
- media_type: tv
  apply: sonarr
"#,
    );

    let event = show_webhook();
    let data = arcane_data();
    let first = FilterResolver::resolve(&event, &data, &rules).into_target();

    for _ in 0..10 {
        assert_eq!(FilterResolver::resolve(&event, &data, &rules).into_target(), first);
    }
    assert_eq!(first, target("sonarr-anime"));
}

#[test]
fn test_empty_rule_list() {
    let outcome = FilterResolver::resolve(&movie_webhook(), &gladiator_data(), &[]);
    assert!(matches!(outcome, MatchOutcome::NoMatch));
}
