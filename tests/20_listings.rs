mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;
use uuid::Uuid;
use wanderlust::database::Store;

#[tokio::test]
async fn create_redirects_and_appears_in_index() -> Result<()> {
    let mut app = TestApp::new();
    let owner = app.signup("cabin_owner").await?;

    let res = app
        .post_form("/listings", &[("listing[title]", "Cabin"), ("listing[price]", "100")])
        .await?;
    assert_eq!(res.status, StatusCode::FOUND);
    assert_eq!(res.location.as_deref(), Some("/listings"));

    let index = app.get("/listings").await?;
    assert_eq!(index.status, StatusCode::OK);
    assert!(index.body.contains("Cabin"), "index missing listing: {}", index.body);
    assert!(index.body.contains("New Listing Created!"), "flash not shown");

    let listings = app.store.list_listings().await?;
    assert_eq!(listings.len(), 1);
    assert!(listings[0].is_owned_by(owner));
    assert!(listings[0].reviews.is_empty());

    Ok(())
}

#[tokio::test]
async fn flash_is_shown_only_once() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("flash_once").await?;
    app.create_listing("Cabin").await?;

    let first = app.get("/listings").await?;
    assert!(first.body.contains("New Listing Created!"));

    let second = app.get("/listings").await?;
    assert!(!second.body.contains("New Listing Created!"));

    Ok(())
}

#[tokio::test]
async fn create_without_title_is_rejected_and_not_persisted() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("no_title").await?;

    let res = app
        .post_form("/listings", &[("listing[title]", "  "), ("listing[price]", "100")])
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("is required"), "body: {}", res.body);
    assert!(app.store.list_listings().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn create_with_bad_price_is_rejected() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("bad_price").await?;

    let res = app
        .post_form("/listings", &[("listing[title]", "Cabin"), ("listing[price]", "cheap")])
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.store.list_listings().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn show_resolves_owner_and_rejects_bad_ids() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("shown_owner").await?;
    let listing = app.create_listing("Lakeside Cabin").await?;

    let res = app.get(&format!("/listings/{}", listing.id)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Lakeside Cabin"));
    assert!(res.body.contains("shown_owner"));

    let res = app.get("/listings/not-an-id").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Invalid ID"));

    let res = app.get(&format!("/listings/{}", Uuid::new_v4())).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn owner_updates_listing_through_method_override() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("updater").await?;
    let listing = app.create_listing("Old Title").await?;

    let edit = app.get(&format!("/listings/{}/edit", listing.id)).await?;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains("Old Title"));

    let res = app
        .post_form(
            &format!("/listings/{}?_method=PUT", listing.id),
            &[("listing[title]", "New Title"), ("listing[price]", "150")],
        )
        .await?;
    let detail = format!("/listings/{}", listing.id);
    assert!(res.is_redirect_to(&detail), "got {} {:?}", res.status, res.location);

    let stored = app.store.find_listing(listing.id).await?.expect("listing");
    assert_eq!(stored.title, "New Title");
    assert_eq!(stored.price.as_deref(), Some("150"));
    assert_eq!(stored.owner, listing.owner);

    Ok(())
}

#[tokio::test]
async fn update_leaves_unsubmitted_fields_alone() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("partial").await?;
    let listing = app.create_listing("Lakeside").await?;
    let path = format!("/listings/{}?_method=PUT", listing.id);

    let res = app.post_form(&path, &[("listing[title]", "Renamed")]).await?;
    assert!(res.is_redirect_to(&format!("/listings/{}", listing.id)));

    let stored = app.store.find_listing(listing.id).await?.expect("listing");
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.price.as_deref(), Some("120"));
    assert_eq!(stored.location.as_deref(), Some("Lake Tahoe"));
    assert_eq!(stored.description.as_deref(), Some("A quiet place"));

    // A submitted but blank field clears the value
    app.post_form(&path, &[("listing[title]", "Renamed"), ("listing[price]", "")])
        .await?;
    let stored = app.store.find_listing(listing.id).await?.expect("listing");
    assert!(stored.price.is_none());
    assert_eq!(stored.location.as_deref(), Some("Lake Tahoe"));

    Ok(())
}

#[tokio::test]
async fn non_owner_is_redirected_from_edit_and_update() -> Result<()> {
    let mut owner = TestApp::new();
    owner.signup("real_owner").await?;
    let listing = owner.create_listing("Guarded").await?;

    let mut intruder = owner.another_client();
    intruder.signup("intruder").await?;

    let detail = format!("/listings/{}", listing.id);
    let res = intruder.get(&format!("{}/edit", detail)).await?;
    assert!(res.is_redirect_to(&detail), "got {} {:?}", res.status, res.location);

    let res = intruder
        .post_form(&format!("{}?_method=PUT", detail), &[("listing[title]", "Hijacked")])
        .await?;
    assert!(res.is_redirect_to(&detail));

    let page = intruder.get(&detail).await?;
    assert!(page.body.contains("It can only be done by the owner."));

    let stored = owner.store.find_listing(listing.id).await?.expect("listing");
    assert_eq!(stored.title, "Guarded");

    Ok(())
}

#[tokio::test]
async fn anonymous_writes_redirect_to_login() -> Result<()> {
    let mut app = TestApp::new();

    let res = app.post_form("/listings", &[("listing[title]", "Cabin")]).await?;
    assert!(res.is_redirect_to("/login"));
    assert!(app.store.list_listings().await?.is_empty());

    let res = app.get("/listings/new").await?;
    assert!(res.is_redirect_to("/login"));

    let login = app.get("/login").await?;
    assert!(login.body.contains("You must be logged in to do that"));

    Ok(())
}

#[tokio::test]
async fn delete_removes_listing_and_missing_id_is_404() -> Result<()> {
    let mut app = TestApp::new();
    app.signup("deleter").await?;
    let listing = app.create_listing("Doomed").await?;

    let res = app
        .post_form(&format!("/listings/{}?_method=DELETE", listing.id), &[])
        .await?;
    assert!(res.is_redirect_to("/listings"));
    assert!(app.store.find_listing(listing.id).await?.is_none());

    let res = app
        .post_form(&format!("/listings/{}?_method=DELETE", Uuid::new_v4()), &[])
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.post_form("/listings/garbage?_method=DELETE", &[]).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    Ok(())
}
