use crate::common::{TestApp, programs, routes, seed, submission_body};

const USER: i32 = 1;

mod runs {
    use super::*;

    #[tokio::test]
    async fn run_is_judged_like_a_submission() {
        let app = TestApp::spawn().await;

        let res = app
            .post_as(
                routes::RUNS,
                &submission_body(seed::PROBLEM, None, programs::ACCEPTED),
                USER,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "pending");

        let res = app.wait_for_verdict(&routes::run(res.run_id()), USER).await;
        assert_eq!(res.body["status"], "accepted");
        assert_eq!(res.body["score"], 100);
    }

    #[tokio::test]
    async fn runs_are_not_visible_as_submissions() {
        let app = TestApp::spawn().await;

        let res = app
            .post_as(
                routes::RUNS,
                &submission_body(seed::PROBLEM, None, programs::ACCEPTED),
                USER,
            )
            .await;
        assert_eq!(res.status, 201);

        let res = app.get_as(&routes::submission(res.run_id()), USER).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn runs_go_through_the_same_gate() {
        let app = TestApp::spawn().await;

        let res = app
            .post_as(
                routes::RUNS,
                &submission_body(
                    seed::CONTEST_PROBLEM,
                    Some(seed::OPEN_CONTEST),
                    programs::ACCEPTED,
                ),
                USER,
            )
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "NOT_REGISTERED");
    }

    #[tokio::test]
    async fn unknown_run_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_as(&routes::run(1), USER).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Run not found");
    }
}

mod service {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = TestApp::spawn().await;

        let res = app.get_anonymous(routes::HEALTH).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_document_lists_judging_routes() {
        let app = TestApp::spawn().await;

        let res = app.get_anonymous(routes::OPENAPI).await;

        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/submissions"));
        assert!(paths.contains_key("/api/v1/submissions/{id}"));
        assert!(paths.contains_key("/api/v1/runs"));
    }
}
