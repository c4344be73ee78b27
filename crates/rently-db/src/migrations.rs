use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY,
            role          TEXT NOT NULL CHECK (role IN ('client', 'landlord', 'admin')),
            approved      INTEGER NOT NULL DEFAULT 0,
            suspended     INTEGER NOT NULL DEFAULT 0,
            display_name  TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS rentals (
            id          INTEGER PRIMARY KEY,
            owner_id    INTEGER NOT NULL REFERENCES users(id),
            status      TEXT NOT NULL CHECK (status IN ('available', 'booked')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id    INTEGER NOT NULL REFERENCES users(id),
            receiver_id  INTEGER NOT NULL REFERENCES users(id),
            rental_id    INTEGER REFERENCES rentals(id),
            body         TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_rental
            ON messages(rental_id, id);
        CREATE INDEX IF NOT EXISTS idx_messages_sender
            ON messages(sender_id);
        CREATE INDEX IF NOT EXISTS idx_messages_receiver
            ON messages(receiver_id);

        -- Seed the platform administrator account
        INSERT OR IGNORE INTO users (id, role, approved, suspended, display_name, email)
            VALUES (1, 'admin', 1, 0, 'Administrator', 'admin@rently.local');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
