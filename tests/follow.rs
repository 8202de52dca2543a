#[macro_use]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{self, *};
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use yatube::follow::{count_followers, follow_author, is_following, FollowOutcome};

    #[actix_rt::test]
    async fn test_follow_and_unfollow() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        let reader = make_user(&fixture.db, "reader").await;
        let app = test_app!(fixture);
        let cookie = login!(app, "reader");

        let req = test::TestRequest::post()
            .uri("/profile/author/follow/")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/profile/author/"
        );
        assert!(is_following(&fixture.db, reader.id, author.id).await.unwrap());

        // Following twice keeps a single edge.
        let req = test::TestRequest::get()
            .uri("/profile/author/follow/")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(count_followers(&fixture.db, author.id).await.unwrap(), 1);

        let req = test::TestRequest::get()
            .uri("/profile/author/")
            .cookie(cookie.clone())
            .to_request();
        let body = body_string(test::call_service(&app, req).await).await;
        assert!(body.contains("Followers: 1"));
        assert!(body.contains("Unfollow"));

        let req = test::TestRequest::post()
            .uri("/profile/author/unfollow/")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(!is_following(&fixture.db, reader.id, author.id).await.unwrap());

        // Unfollowing again is a no-op.
        let req = test::TestRequest::post()
            .uri("/profile/author/unfollow/")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(count_followers(&fixture.db, author.id).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn test_concurrent_follows_make_one_edge() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        let reader = make_user(&fixture.db, "reader").await;

        let (first, second) = futures::future::join(
            follow_author(&fixture.db, reader.id, author.id),
            follow_author(&fixture.db, reader.id, author.id),
        )
        .await;
        let mut outcomes = vec![first.unwrap(), second.unwrap()];
        outcomes.sort_by_key(|o| *o == FollowOutcome::Created);
        assert_eq!(
            outcomes,
            vec![FollowOutcome::AlreadyFollowing, FollowOutcome::Created]
        );
        assert_eq!(count_followers(&fixture.db, author.id).await.unwrap(), 1);

        assert_eq!(
            follow_author(&fixture.db, reader.id, author.id).await.unwrap(),
            FollowOutcome::AlreadyFollowing
        );
    }

    #[actix_rt::test]
    async fn test_cannot_follow_self() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        let app = test_app!(fixture);
        let cookie = login!(app, "author");

        let req = test::TestRequest::post()
            .uri("/profile/author/follow/")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(!is_following(&fixture.db, author.id, author.id).await.unwrap());

        // No follow button on your own profile.
        let req = test::TestRequest::get()
            .uri("/profile/author/")
            .cookie(cookie)
            .to_request();
        let body = body_string(test::call_service(&app, req).await).await;
        assert!(!body.contains("class=\"follow\""));

        assert_eq!(
            follow_author(&fixture.db, author.id, author.id).await.unwrap(),
            FollowOutcome::SelfFollow
        );
    }

    #[actix_rt::test]
    async fn test_follow_feed() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        let reader = make_user(&fixture.db, "reader").await;
        make_user(&fixture.db, "lurker").await;
        let other = make_user(&fixture.db, "other").await;
        make_post(&fixture.db, &author, "Followed author's post", None).await;
        make_post(&fixture.db, &other, "Unfollowed author's post", None).await;
        follow_author(&fixture.db, reader.id, author.id).await.unwrap();
        let app = test_app!(fixture);

        let cookie = login!(app, "reader");
        let req = test::TestRequest::get()
            .uri("/follow/")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_string(resp).await;
        assert_eq!(count_post_cards(&body), 1);
        assert!(body.contains("Followed author"));
        assert!(!body.contains("Unfollowed author"));

        let cookie = login!(app, "lurker");
        let req = test::TestRequest::get()
            .uri("/follow/")
            .cookie(cookie)
            .to_request();
        let body = body_string(test::call_service(&app, req).await).await;
        assert_eq!(count_post_cards(&body), 0);

        let req = test::TestRequest::get().uri("/follow/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
}
