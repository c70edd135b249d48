use chrono::{Duration, Utc};
use uuid::Uuid;

use passgate_idp::usecase::backend::{AuthenticateInput, MagicLinkBackend};

use crate::helpers::{
    MockLinkRepo, MockUserRepo, enabled_settings, magic_link_settings, test_link, test_user,
};

fn auth_input(token: &str, username: Option<&str>) -> AuthenticateInput {
    AuthenticateInput {
        token: token.to_owned(),
        username: username.map(str::to_owned),
        site: None,
    }
}

#[tokio::test]
async fn should_authenticate_and_record_the_use() {
    let link = test_link("learner");
    let token = link.token.clone();
    let repo = MockLinkRepo::new(vec![link]);
    let links_handle = repo.links_handle();

    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: repo,
    };

    let login = backend
        .authenticate(auth_input(&token, Some("learner")))
        .await
        .unwrap()
        .expect("expected an authenticated login");

    assert_eq!(login.user.username, "learner");
    assert_eq!(login.redirect_url, "/dashboard");

    let links = links_handle.lock().unwrap();
    assert_eq!(links[0].times_used, 1);
    assert!(links[0].disabled, "single-use link latches after redemption");
}

#[tokio::test]
async fn should_return_no_identity_for_unknown_token() {
    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: MockLinkRepo::empty(),
    };

    let login = backend
        .authenticate(auth_input("fake", Some("learner")))
        .await
        .unwrap();
    assert!(login.is_none());
}

#[tokio::test]
async fn should_return_no_identity_for_mismatched_username_without_latching() {
    let link = test_link("learner");
    let token = link.token.clone();
    let repo = MockLinkRepo::new(vec![link]);
    let links_handle = repo.links_handle();

    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: repo,
    };

    let login = backend
        .authenticate(auth_input(&token, Some("fake_user")))
        .await
        .unwrap();
    assert!(login.is_none());

    // The specific reason is discarded, but the record is untouched.
    let links = links_handle.lock().unwrap();
    assert!(!links[0].disabled);
    assert_eq!(links[0].times_used, 0);
}

#[tokio::test]
async fn should_return_no_identity_for_missing_username() {
    let link = test_link("learner");
    let token = link.token.clone();

    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: MockLinkRepo::new(vec![link]),
    };

    let login = backend.authenticate(auth_input(&token, None)).await.unwrap();
    assert!(login.is_none());
}

#[tokio::test]
async fn should_return_no_identity_for_expired_link_and_latch() {
    let mut link = test_link("learner");
    link.expiry = Utc::now() - Duration::seconds(1);
    let token = link.token.clone();
    let repo = MockLinkRepo::new(vec![link]);
    let links_handle = repo.links_handle();

    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: repo,
    };

    let login = backend
        .authenticate(auth_input(&token, Some("learner")))
        .await
        .unwrap();
    assert!(login.is_none());
    assert!(links_handle.lock().unwrap()[0].disabled);
}

#[tokio::test]
async fn should_return_no_identity_for_latched_link() {
    let mut link = test_link("learner");
    link.disabled = true;
    let token = link.token.clone();

    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: MockLinkRepo::new(vec![link]),
    };

    let login = backend
        .authenticate(auth_input(&token, Some("learner")))
        .await
        .unwrap();
    assert!(login.is_none());
}

#[tokio::test]
async fn get_user_resolves_existing_account() {
    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: MockLinkRepo::empty(),
    };

    let user = backend.get_user(test_user().id).await.unwrap();
    assert_eq!(user.unwrap().username, "learner");
}

#[tokio::test]
async fn get_user_returns_none_for_unknown_id() {
    let backend = MagicLinkBackend {
        settings: enabled_settings(magic_link_settings()),
        users: MockUserRepo::new(vec![test_user()]),
        links: MockLinkRepo::empty(),
    };

    let user = backend.get_user(Uuid::new_v4()).await.unwrap();
    assert!(user.is_none());
}
