use crate::Database;
use crate::models::{MessageRow, RentalRow, UserRow};
use anyhow::{Result, anyhow};
use rently_types::models::{RentalRecord, RentalStatus, Role, UserProfile};
use rusqlite::Connection;

impl Database {
    // -- Users (reference data, written by the identity provider side) --

    pub fn insert_user(&self, user: &UserProfile) -> Result<()> {
        let role = match user.role {
            Role::Client => "client",
            Role::Landlord => "landlord",
            Role::Admin => "admin",
        };
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, role, approved, suspended, display_name, email)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id,
                    role,
                    user.approved,
                    user.suspended,
                    user.display_name,
                    user.email
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    // -- Rentals (reference data, written by the listing directory side) --

    pub fn insert_rental(&self, rental: &RentalRecord) -> Result<()> {
        let status = match rental.status {
            RentalStatus::Available => "available",
            RentalStatus::Booked => "booked",
        };
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO rentals (id, owner_id, status) VALUES (?1, ?2, ?3)",
                rusqlite::params![rental.id, rental.owner_id, status],
            )?;
            Ok(())
        })
    }

    pub fn get_rental(&self, id: i64) -> Result<Option<RentalRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, owner_id, status FROM rentals WHERE id = ?1",
                [id],
                |row| {
                    Ok(RentalRow {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                        status: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    // -- Messages --

    /// Append a message and read the stored row back, so the caller gets
    /// the id and timestamp SQLite assigned.
    pub fn insert_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        rental_id: Option<i64>,
        body: &str,
    ) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender_id, receiver_id, rental_id, body)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![sender_id, receiver_id, rental_id, body],
            )?;
            let id = conn.last_insert_rowid();
            query_message(conn, id)?.ok_or_else(|| anyhow!("message {} vanished after insert", id))
        })
    }

    pub fn messages_by_rental(&self, rental_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, receiver_id, rental_id, body, created_at
                 FROM messages WHERE rental_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([rental_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn messages_by_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, receiver_id, rental_id, body, created_at
                 FROM messages WHERE sender_id = ?1 OR receiver_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    conn.query_row(
        "SELECT id, role, approved, suspended, display_name, email FROM users WHERE id = ?1",
        [id],
        |row| {
            Ok(UserRow {
                id: row.get(0)?,
                role: row.get(1)?,
                approved: row.get(2)?,
                suspended: row.get(3)?,
                display_name: row.get(4)?,
                email: row.get(5)?,
            })
        },
    )
    .optional()
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    conn.query_row(
        "SELECT id, sender_id, receiver_id, rental_id, body, created_at
         FROM messages WHERE id = ?1",
        [id],
        message_from_row,
    )
    .optional()
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        rental_id: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use rently_types::models::{RentalRecord, RentalStatus, Role, UserProfile};

    fn user(id: i64, role: Role) -> UserProfile {
        UserProfile {
            id,
            role,
            approved: true,
            suspended: false,
            display_name: format!("user-{id}"),
            email: format!("user-{id}@example.test"),
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user(10, Role::Client)).unwrap();
        db.insert_user(&user(20, Role::Landlord)).unwrap();
        db.insert_rental(&RentalRecord {
            id: 5,
            owner_id: 20,
            status: RentalStatus::Available,
        })
        .unwrap();
        db
    }

    #[test]
    fn migrations_seed_the_admin() {
        let db = Database::open_in_memory().unwrap();
        let admin = db.get_user(1).unwrap().unwrap().into_profile().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.approved);
    }

    #[test]
    fn message_ids_are_monotonic() {
        let db = seeded();
        let a = db.insert_message(10, 20, Some(5), "one").unwrap();
        let b = db.insert_message(10, 20, Some(5), "two").unwrap();
        let c = db.insert_message(20, 10, Some(5), "three").unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn insert_returns_the_stored_row() {
        let db = seeded();
        let row = db.insert_message(10, 20, Some(5), "hello").unwrap();
        assert_eq!(row.body, "hello");
        assert_eq!(row.rental_id, Some(5));
        assert!(!row.created_at.is_empty());
        let msg = row.into_message();
        assert!(msg.created_at.timestamp() > 0);
    }

    #[test]
    fn direct_messages_have_null_rental() {
        let db = seeded();
        let row = db.insert_message(1, 10, None, "welcome").unwrap();
        assert_eq!(row.rental_id, None);
        assert!(db.messages_by_rental(5).unwrap().is_empty());
        let for_user = db.messages_by_user(10).unwrap();
        assert_eq!(for_user.len(), 1);
        assert_eq!(for_user[0].id, row.id);
    }

    #[test]
    fn queries_scope_by_rental_and_user() {
        let db = seeded();
        db.insert_message(10, 20, Some(5), "a").unwrap();
        db.insert_message(20, 10, Some(5), "b").unwrap();
        db.insert_message(1, 20, None, "c").unwrap();

        assert_eq!(db.messages_by_rental(5).unwrap().len(), 2);
        assert_eq!(db.messages_by_user(10).unwrap().len(), 2);
        assert_eq!(db.messages_by_user(20).unwrap().len(), 3);
        assert_eq!(db.messages_by_user(1).unwrap().len(), 1);
    }

    #[test]
    fn missing_rows_come_back_as_none() {
        let db = seeded();
        assert!(db.get_user(999).unwrap().is_none());
        assert!(db.get_rental(999).unwrap().is_none());
    }
}
