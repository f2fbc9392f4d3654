use comfy_table::{ContentArrangement, Table};

use super::{ArtworkCard, CommentThread, Control, EventCard, ReservationRow, WorkshopCard};

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn controls_cell(controls: &[Control]) -> String {
    controls
        .iter()
        .map(Control::label)
        .collect::<Vec<_>>()
        .join(", ")
}

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn render_events(cards: &[EventCard]) -> String {
    let mut table = new_table(&["id", "title", "when", "where", "seats", "price", "rating", "actions"]);
    for card in cards {
        let event = &card.event;
        table.add_row(vec![
            event.id.to_string(),
            event.title.clone(),
            format!(
                "{} → {}",
                event.start_date.format(DATE_FORMAT),
                event.end_date.format(DATE_FORMAT)
            ),
            event.location.clone(),
            event.capacity.to_string(),
            event.price.clone(),
            card.star_line(),
            controls_cell(&card.controls),
        ]);
    }
    table.to_string()
}

pub fn render_workshops(cards: &[WorkshopCard]) -> String {
    let mut table = new_table(&[
        "id", "title", "level", "when", "duration", "instructor", "seats", "price", "actions",
    ]);
    for card in cards {
        let workshop = &card.workshop;
        table.add_row(vec![
            workshop.id.to_string(),
            workshop.title.clone(),
            workshop.level.to_string(),
            workshop.start_date.format(DATE_FORMAT).to_string(),
            workshop.duration.clone(),
            workshop.instructor.clone(),
            workshop.capacity.to_string(),
            workshop.price.clone(),
            controls_cell(&card.controls),
        ]);
    }
    table.to_string()
}

pub fn render_artworks(cards: &[ArtworkCard]) -> String {
    let mut table = new_table(&["id", "title", "available", "price", "palette", "actions"]);
    for card in cards {
        let artwork = &card.artwork;
        table.add_row(vec![
            artwork.id.to_string(),
            artwork.title.clone(),
            artwork.quantity_available.to_string(),
            artwork.price.clone(),
            card.palette().join(" "),
            controls_cell(&card.controls),
        ]);
    }
    table.to_string()
}

pub fn render_reservations(rows: &[ReservationRow]) -> String {
    let mut table = new_table(&["id", "artwork", "customer", "email", "qty", "status", "actions"]);
    for row in rows {
        let reservation = &row.reservation;
        table.add_row(vec![
            reservation.id.to_string(),
            reservation.artwork.title.clone(),
            reservation.full_name.clone(),
            reservation.email.clone(),
            reservation.quantity.to_string(),
            reservation.status.to_string(),
            controls_cell(&row.controls),
        ]);
    }
    table.to_string()
}

pub fn render_comments(thread: &CommentThread) -> String {
    let mut table = new_table(&["id", "author", "comment", "moderation", "actions"]);
    for view in &thread.comments {
        let comment = &view.comment;
        let moderation = match &comment.moderation_reason {
            Some(reason) => format!("{} ({})", comment.moderation_status, reason),
            None => comment.moderation_status.to_string(),
        };
        table.add_row(vec![
            comment.id.to_string(),
            comment.user.full_name(),
            comment.content.clone(),
            moderation,
            controls_cell(&view.controls),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Artwork;
    use crate::roles::Role;
    use crate::views::Viewer;

    #[test]
    fn artwork_table_lists_controls() {
        let card = ArtworkCard::new(
            Artwork {
                id: 3,
                title: "Dune".to_string(),
                description: String::new(),
                quantity_available: 4,
                price: "80.00".to_string(),
                image: None,
                color_palette: None,
                created_at: None,
            },
            &Viewer::new(Role::Artist, 1),
        );
        let rendered = render_artworks(&[card]);
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("analyze"));
        assert!(!rendered.contains("reserve"));
    }
}
