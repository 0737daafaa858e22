//! Batched SQL scripts for the administrative endpoints
//!
//! A script is a sequence of batches separated by lines that consist solely
//! of `GO` (any case, surrounding whitespace ignored). Batches run in order.

/// Sample data for `POST /api/db/populate`
///
/// `INSERT OR IGNORE` keeps repeated population from failing on existing keys.
pub const SEED_SCRIPT: &str = r#"
INSERT OR IGNORE INTO record_label (record_label_id, name, location, website, email, phone_number) VALUES
    (1, 'Blue Harbour Records', 'Lisbon', 'https://blueharbour.example', 'info@blueharbour.example', '+351 210 000 001'),
    (2, 'Northern Lights Music', 'Porto', 'https://northernlights.example', 'contact@northernlights.example', NULL),
    (3, 'Atlas Sound', 'Coimbra', NULL, 'hello@atlassound.example', '+351 239 000 003');
GO
INSERT OR IGNORE INTO person (nif, name, date_of_birth, email, phone_number) VALUES
    ('100000001', 'Ana Ribeiro', '1988-03-14', 'ana.ribeiro@example.com', '+351 910 000 001'),
    ('100000002', 'Bruno Costa', '1979-11-02', 'bruno.costa@example.com', NULL),
    ('100000003', 'Carla Mendes', '1995-07-21', NULL, '+351 930 000 003'),
    ('100000004', 'Diogo Santos', '1983-01-30', 'diogo.santos@example.com', '+351 960 000 004'),
    ('100000005', 'Eva Martins', NULL, 'eva.martins@example.com', NULL);
GO
INSERT OR IGNORE INTO contributor (contributor_id, nif, roles) VALUES
    (1, '100000001', 'Singer, Songwriter'),
    (2, '100000002', 'Producer'),
    (3, '100000003', 'Guitarist, Arranger');
GO
INSERT OR IGNORE INTO employee (employee_id, nif, job_title, department, salary, hire_date, record_label_id) VALUES
    (1, '100000004', 'A&R Manager', 'Artists and Repertoire', 3200.0, '2019-09-01', 1),
    (2, '100000005', 'Sound Engineer', 'Studio', 2800.0, '2021-02-15', 2),
    (3, '100000002', 'Label Producer', 'Studio', 3500.0, '2018-05-10', 1);
GO
INSERT OR IGNORE INTO genre (genre_id, name) VALUES
    (1, 'Fado'),
    (2, 'Pop'),
    (3, 'Jazz'),
    (4, 'World');
GO
INSERT OR IGNORE INTO song (song_id, title, duration, release_date) VALUES
    (1, 'Saudade do Mar', 245, '2022-04-08'),
    (2, 'Night Drive', 198, '2023-10-20'),
    (3, 'Blue Hour', 312, NULL);
GO
INSERT OR IGNORE INTO song_genre (song_id, genre_id, position) VALUES
    (1, 1, 0), (1, 4, 1),
    (2, 2, 0),
    (3, 3, 0), (3, 4, 1);
GO
INSERT OR IGNORE INTO song_contributor (song_id, contributor_id, position) VALUES
    (1, 1, 0), (1, 3, 1),
    (2, 2, 0),
    (3, 3, 0);
GO
INSERT OR IGNORE INTO collaboration (collaboration_id, collaboration_name, start_date, end_date, description, song_id) VALUES
    (1, 'Harbour Sessions', '2022-01-10', '2022-03-30', 'Joint recording of the spring single', 1),
    (2, 'Northern Nights Tour Single', '2023-06-01', NULL, 'Cross-label tour release', 2);
GO
INSERT OR IGNORE INTO collaboration_record_label (collaboration_id, record_label_id, position) VALUES
    (1, 1, 0), (1, 3, 1),
    (2, 2, 0);
GO
INSERT OR IGNORE INTO collaboration_contributor (collaboration_id, contributor_id, position) VALUES
    (1, 1, 0), (1, 3, 1),
    (2, 2, 0);
"#;

/// Drop every view and table, children before parents
pub const DROP_SCRIPT: &str = r#"
DROP VIEW IF EXISTS vw_dashboard_counts;
DROP VIEW IF EXISTS vw_collaborations;
DROP VIEW IF EXISTS vw_songs;
DROP VIEW IF EXISTS vw_record_labels;
DROP VIEW IF EXISTS vw_employees;
DROP VIEW IF EXISTS vw_contributors;
GO
DROP TABLE IF EXISTS collaboration_contributor;
DROP TABLE IF EXISTS collaboration_record_label;
DROP TABLE IF EXISTS collaboration;
DROP TABLE IF EXISTS song_contributor;
DROP TABLE IF EXISTS song_genre;
DROP TABLE IF EXISTS genre;
DROP TABLE IF EXISTS song;
GO
DROP TABLE IF EXISTS employee;
DROP TABLE IF EXISTS contributor;
DROP TABLE IF EXISTS record_label;
DROP TABLE IF EXISTS person;
"#;

/// Split a script into non-empty batches on `GO` separator lines
pub fn split_batches(script: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();

    for line in script.lines() {
        if line.trim().eq_ignore_ascii_case("go") {
            push_batch(&mut batches, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_batch(&mut batches, &mut current);

    batches
}

fn push_batch(batches: &mut Vec<String>, current: &mut String) {
    let batch = current.trim();
    if !batch.is_empty() {
        batches.push(batch.to_string());
    }
    current.clear();
}
