#[macro_use]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{self, *};
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use yatube::orm::comments;

    #[actix_rt::test]
    async fn test_guest_cannot_comment() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        let post = make_post(&fixture.db, &author, "Comment on me", None).await;
        let app = test_app!(fixture);

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .set_form(&[("text", "Anonymous remark")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("/auth/login/?next="));

        assert_eq!(
            comments::Entity::find().count(fixture.db.get_ref()).await.unwrap(),
            0
        );
    }

    #[actix_rt::test]
    async fn test_comment_appears_on_post() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        make_user(&fixture.db, "reader").await;
        let post = make_post(&fixture.db, &author, "Comment on me", None).await;
        let app = test_app!(fixture);
        let cookie = login!(app, "reader");

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .cookie(cookie.clone())
            .set_form(&[("text", "Great post")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            format!("/posts/{}/", post.id).as_str()
        );

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = body_string(resp).await;
        assert!(body.contains("Great post"));
        assert!(body.contains("Add a comment"));

        let stored = comments::Entity::find()
            .all(fixture.db.get_ref())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].post_id, post.id);
    }

    #[actix_rt::test]
    async fn test_invalid_comments_are_refused() {
        let fixture = setup().await;
        let author = make_user(&fixture.db, "author").await;
        let post = make_post(&fixture.db, &author, "Comment on me", None).await;
        let app = test_app!(fixture);
        let cookie = login!(app, "author");

        let too_long = "a".repeat(101);
        for text in ["", "ты дебил", too_long.as_str()] {
            let req = test::TestRequest::post()
                .uri(&format!("/posts/{}/comment/", post.id))
                .cookie(cookie.clone())
                .set_form(&[("text", text)])
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body = body_string(resp).await;
            assert!(body.contains("class=\"error\""));
            assert!(body.contains("Comment on me"));
        }

        assert_eq!(
            comments::Entity::find().count(fixture.db.get_ref()).await.unwrap(),
            0
        );

        // Exactly at the limit is fine.
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .cookie(cookie)
            .set_form(&[("text", "b".repeat(100))])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[actix_rt::test]
    async fn test_comment_on_missing_post() {
        let fixture = setup().await;
        make_user(&fixture.db, "author").await;
        let app = test_app!(fixture);
        let cookie = login!(app, "author");

        let req = test::TestRequest::post()
            .uri("/posts/404/comment/")
            .cookie(cookie)
            .set_form(&[("text", "Hello?")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
