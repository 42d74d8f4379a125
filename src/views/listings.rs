use crate::database::models::{Listing, ReviewView};
use crate::middleware::CurrentUser;

use super::{attr, escape};

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_default()
}

fn price_label(price: &Option<String>) -> String {
    match price {
        Some(price) => format!("&#8377; {} / night", escape(price)),
        None => "Price on request".to_string(),
    }
}

pub fn index(listings: &[Listing]) -> String {
    if listings.is_empty() {
        return r#"        <h3>All Listings</h3>
        <p class="empty">No listings yet.</p>"#
            .to_string();
    }

    let cards: String = listings
        .iter()
        .map(|listing| {
            let image = listing
                .image
                .as_ref()
                .map(|image| {
                    format!(
                        r#"<img src="{}" alt="{}" class="card-img">"#,
                        attr(&image.url),
                        attr(&image.filename)
                    )
                })
                .unwrap_or_default();

            format!(
                r#"
        <a href="/listings/{id}" class="listing-link">
            <div class="card">
                {image}
                <p class="card-text"><b>{title}</b><br>{price}</p>
            </div>
        </a>"#,
                id = listing.id,
                image = image,
                title = escape(&listing.title),
                price = price_label(&listing.price),
            )
        })
        .collect();

    format!(
        r#"        <h3>All Listings</h3>
        <div class="listings">{}
        </div>"#,
        cards
    )
}

pub fn show(
    listing: &Listing,
    owner_name: Option<&str>,
    reviews: &[ReviewView],
    user: Option<&CurrentUser>,
) -> String {
    let is_owner = user.map(|user| listing.is_owned_by(user.id)).unwrap_or(false);

    let image = listing
        .image
        .as_ref()
        .map(|image| {
            format!(
                r#"<img src="{}" alt="{}" class="show-img">"#,
                attr(&image.url),
                attr(&image.filename)
            )
        })
        .unwrap_or_default();

    let owner_actions = if is_owner {
        format!(
            r#"
        <div class="owner-actions">
            <a href="/listings/{id}/edit" class="btn">Edit</a>
            <form method="POST" action="/listings/{id}?_method=DELETE">
                <button class="btn btn-dark">Delete</button>
            </form>
        </div>"#,
            id = listing.id
        )
    } else {
        String::new()
    };

    let review_form = if user.is_some() {
        format!(
            r#"
        <h4>Leave a Review</h4>
        <form method="POST" action="/listings/{id}/reviews" class="review-form">
            <label for="rating">Rating</label>
            <input type="range" min="1" max="5" id="rating" name="review[rating]" value="3">
            <label for="comment">Comments</label>
            <textarea id="comment" name="review[comment]" rows="4" required></textarea>
            <button class="btn">Submit</button>
        </form>"#,
            id = listing.id
        )
    } else {
        String::new()
    };

    let review_cards: String = reviews
        .iter()
        .map(|view| {
            let delete = match user {
                Some(user) if view.review.is_authored_by(user.id) => format!(
                    r#"
                <form method="POST" action="/listings/{}/reviews/{}?_method=DELETE">
                    <button class="btn btn-sm btn-dark">Delete</button>
                </form>"#,
                    listing.id, view.review.id
                ),
                _ => String::new(),
            };

            format!(
                r#"
            <div class="review-card">
                <h5>@{author}</h5>
                <p class="rating" data-rating="{rating}">{rating} stars</p>
                <p>{comment}</p>{delete}
            </div>"#,
                author = escape(view.author_name.as_deref().unwrap_or("unknown")),
                rating = view.review.rating,
                comment = escape(&view.review.comment),
                delete = delete,
            )
        })
        .collect();

    format!(
        r#"        <h3>{title}</h3>
        <div class="listing-card">
            {image}
            <p class="owner">Owned by <i>{owner}</i></p>
            <p>{description}</p>
            <p>{price}</p>
            <p>{location}</p>
            <p>{country}</p>
        </div>{owner_actions}
        <hr>{review_form}
        <h4>All Reviews</h4>
        <div class="reviews">{review_cards}
        </div>"#,
        title = escape(&listing.title),
        image = image,
        owner = escape(owner_name.unwrap_or("unknown")),
        description = opt(&listing.description),
        price = price_label(&listing.price),
        location = opt(&listing.location),
        country = opt(&listing.country),
        owner_actions = owner_actions,
        review_form = review_form,
        review_cards = review_cards,
    )
}

fn listing_fields(listing: Option<&Listing>) -> String {
    let value = |field: Option<&Option<String>>| {
        field
            .and_then(|value| value.as_deref())
            .map(attr)
            .unwrap_or_default()
    };
    let title = listing.map(|l| attr(&l.title)).unwrap_or_default();
    let image = listing
        .and_then(|l| l.image.as_ref())
        .map(|image| attr(&image.url))
        .unwrap_or_default();

    format!(
        r#"
            <label for="title">Title</label>
            <input id="title" name="listing[title]" value="{title}" required>
            <label for="description">Description</label>
            <textarea id="description" name="listing[description]">{description}</textarea>
            <label for="image">Image link</label>
            <input id="image" name="listing[image]" value="{image}">
            <label for="price">Price</label>
            <input id="price" name="listing[price]" value="{price}">
            <label for="country">Country</label>
            <input id="country" name="listing[country]" value="{country}">
            <label for="location">Location</label>
            <input id="location" name="listing[location]" value="{location}">"#,
        title = title,
        description = listing.map(|l| opt(&l.description)).unwrap_or_default(),
        image = image,
        price = value(listing.map(|l| &l.price)),
        country = value(listing.map(|l| &l.country)),
        location = value(listing.map(|l| &l.location)),
    )
}

pub fn new_form() -> String {
    format!(
        r#"        <h3>Create a New Listing</h3>
        <form method="POST" action="/listings" class="listing-form">{}
            <button class="btn">Add</button>
        </form>"#,
        listing_fields(None)
    )
}

pub fn edit_form(listing: &Listing) -> String {
    format!(
        r#"        <h3>Edit your Listing</h3>
        <form method="POST" action="/listings/{id}?_method=PUT" class="listing-form">{fields}
            <button class="btn">Edit</button>
        </form>"#,
        id = listing.id,
        fields = listing_fields(Some(listing))
    )
}
