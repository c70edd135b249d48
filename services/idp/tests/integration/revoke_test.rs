use uuid::Uuid;

use passgate_idp::domain::repository::MagicLinkRepository;
use passgate_idp::error::IdpServiceError;
use passgate_idp::usecase::link::RevokeLinkUseCase;

use crate::helpers::{MockLinkRepo, disabled_settings, enabled_settings, magic_link_settings, test_link};

#[tokio::test]
async fn should_revoke_existing_link() {
    let link = test_link("learner");
    let id = link.id;
    let repo = MockLinkRepo::new(vec![link]);
    let links_handle = repo.links_handle();

    let uc = RevokeLinkUseCase {
        settings: enabled_settings(magic_link_settings()),
        links: repo,
    };

    uc.execute(id, None).await.unwrap();

    let links = links_handle.lock().unwrap();
    assert!(links[0].disabled);
    assert_eq!(links[0].times_used, 1);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_link() {
    let uc = RevokeLinkUseCase {
        settings: enabled_settings(magic_link_settings()),
        links: MockLinkRepo::empty(),
    };

    let result = uc.execute(Uuid::new_v4(), None).await;
    assert!(
        matches!(result, Err(IdpServiceError::LinkNotFound)),
        "expected LinkNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_when_feature_is_disabled() {
    let link = test_link("learner");
    let id = link.id;

    let uc = RevokeLinkUseCase {
        settings: disabled_settings(),
        links: MockLinkRepo::new(vec![link]),
    };

    let result = uc.execute(id, None).await;
    assert!(
        matches!(result, Err(IdpServiceError::FeatureDisabled)),
        "expected FeatureDisabled, got {result:?}"
    );
}

#[tokio::test]
async fn disable_latch_is_idempotent_but_counter_is_not() {
    // The latch settles after one call; times_used still counts every call.
    // Preserved from the original behavior, where "count a use" and
    // "force-terminate" are coupled.
    let link = test_link("learner");
    let id = link.id;
    let repo = MockLinkRepo::new(vec![link]);
    let links_handle = repo.links_handle();

    repo.disable(id).await.unwrap();
    {
        let links = links_handle.lock().unwrap();
        assert!(links[0].disabled);
        assert_eq!(links[0].times_used, 1);
    }

    repo.disable(id).await.unwrap();
    {
        let links = links_handle.lock().unwrap();
        assert!(links[0].disabled, "latch stays set");
        assert_eq!(links[0].times_used, 2, "counter still increments");
    }
}
