use surrealdb::sql::{Id, Thing};

pub const SONG_TABLE: &str = "song";
pub const USER_TABLE: &str = "user";
pub const PLAYLIST_TABLE: &str = "playlist";

/// Strips a `table:` prefix if the caller passed a full record id.
pub fn parse_id_part(id: &str) -> &str {
    id.split_once(':').map_or(id, |(_, id_part)| id_part)
}

/// Bare id of a record, as exposed in API payloads.
pub fn thing_to_id(thing: &Thing) -> String {
    match &thing.id {
        Id::String(s) => s.clone(),
        Id::Number(n) => n.to_string(),
        other => other.to_raw(),
    }
}

fn create_thing(table: &str, id: &str) -> Thing {
    let clean_id = parse_id_part(id);
    Thing::from((table.to_string(), clean_id.to_string()))
}

pub fn create_user_thing(user_id: &str) -> Thing {
    create_thing(USER_TABLE, user_id)
}

pub fn create_song_thing(song_id: &str) -> Thing {
    create_thing(SONG_TABLE, song_id)
}

pub fn create_playlist_thing(playlist_id: &str) -> Thing {
    create_thing(PLAYLIST_TABLE, playlist_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_part() {
        assert_eq!(parse_id_part("user:123"), "123");
        assert_eq!(parse_id_part("123"), "123");
        assert_eq!(parse_id_part("playlist:test_playlist"), "test_playlist");
        assert_eq!(parse_id_part("song:b:c"), "b:c");
    }

    #[test]
    fn test_create_things() {
        let user_thing = create_user_thing("user:12");
        assert_eq!(user_thing.tb, "user");
        assert_eq!(thing_to_id(&user_thing), "12");

        let song_thing = create_song_thing("56");
        assert_eq!(song_thing.tb, "song");
        assert_eq!(thing_to_id(&song_thing), "56");

        let playlist_thing = create_playlist_thing("playlist:90");
        assert_eq!(playlist_thing.tb, "playlist");
        assert_eq!(thing_to_id(&playlist_thing), "90");
    }
}
