use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use crate::support::{body_json, create_test_app, Api};

#[actix_web::test]
async fn check_in_lists_others_and_check_out_removes() {
    let api = Api::new().await;
    let app = create_test_app(api.state.clone()).build().await;

    let resp = test::call_service(
        &app,
        api.put("/api/venues/southbank/presence", "ann").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let presence = body_json(resp).await;
    assert_eq!(presence["venue_id"], "southbank");
    assert_eq!(presence["name"], "ANN");

    for player in ["ben", "cat"] {
        test::call_service(
            &app,
            api.put("/api/venues/southbank/presence", player).to_request(),
        )
        .await;
    }
    test::call_service(
        &app,
        api.put("/api/venues/stockwell/presence", "dan").to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        api.get("/api/venues/southbank/players", "ann").to_request(),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["venue_id"], "southbank");
    assert_eq!(
        body["players"],
        json!([{ "id": "ben", "name": "BEN" }, { "id": "cat", "name": "CAT" }])
    );

    let resp = test::call_service(&app, api.delete("/api/presence", "ben").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    // Second check-out is a no-op.
    let resp = test::call_service(&app, api.delete("/api/presence", "ben").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        api.get("/api/venues/southbank/players", "ann").to_request(),
    )
    .await;
    assert_eq!(
        body_json(resp).await["players"],
        json!([{ "id": "cat", "name": "CAT" }])
    );
}

#[actix_web::test]
async fn checking_in_elsewhere_moves_the_player() {
    let api = Api::new().await;
    let app = create_test_app(api.state.clone()).build().await;

    for venue in ["southbank", "stockwell"] {
        test::call_service(
            &app,
            api.put(&format!("/api/venues/{venue}/presence"), "ben").to_request(),
        )
        .await;
    }

    let resp = test::call_service(
        &app,
        api.get("/api/venues/southbank/players", "ann").to_request(),
    )
    .await;
    assert_eq!(body_json(resp).await["players"], json!([]));

    let resp = test::call_service(
        &app,
        api.get("/api/venues/stockwell/rankings", "ann").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}
