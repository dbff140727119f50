use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::TIMESTAMP_FORMAT;
use crate::models::{
    Booking, BookingFilter, BookingUpdate, DeliveryStatus, Payment, PaymentStatus, RawPrice, Role,
    Service, ServiceUpdate, User, UserStatus,
};

fn ts(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_opt_ts(s: Option<String>) -> Option<NaiveDateTime> {
    s.as_deref().map(parse_ts)
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> anyhow::Result<Vec<T>> {
    let mut items = vec![];
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

// ── Users ──

const USER_COLUMNS: &str = "id, email, name, photo_url, role, status, created_at";

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        photo_url: row.get(3)?,
        role: Role::parse(&role),
        status: UserStatus::parse(&status),
        created_at: parse_ts(&created_at),
    })
}

/// Inserts the user unless the email is already registered. Returns whether a row was written.
pub fn insert_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let count = conn.execute(
        "INSERT INTO users (id, email, name, photo_url, role, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(email) DO NOTHING",
        params![
            user.id,
            user.email,
            user.name,
            user.photo_url,
            user.role.as_str(),
            user.status.as_str(),
            ts(&user.created_at),
        ],
    )?;
    Ok(count > 0)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

/// Case-insensitive substring match on name or email, ordered by name.
pub fn search_users(conn: &Connection, search: &str, descending: bool) -> anyhow::Result<Vec<User>> {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{escaped}%");
    let order = if descending { "DESC" } else { "ASC" };

    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE name LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\'
         ORDER BY name {order}"
    ))?;
    let rows = stmt.query_map(params![pattern], parse_user_row)?;
    collect(rows)
}

pub fn list_active_decorators(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = 'decorator' AND status = 'active' ORDER BY name ASC"
    ))?;
    let rows = stmt.query_map([], parse_user_row)?;
    collect(rows)
}

/// Role changes always (re)activate the account.
pub fn update_user_role(conn: &Connection, id: &str, role: Role) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE users SET role = ?1, status = 'active' WHERE id = ?2",
        params![role.as_str(), id],
    )?;
    Ok(count)
}

pub fn set_user_status(conn: &Connection, id: &str, status: UserStatus) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE users SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count)
}

pub fn delete_user(conn: &Connection, id: &str) -> anyhow::Result<usize> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count)
}

// ── Services ──

const SERVICE_COLUMNS: &str = "id, name, price, image, description, category, created_by, created_at";

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    let created_at: String = row.get(7)?;
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        image: row.get(3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        created_by: row.get(6)?,
        created_at: parse_ts(&created_at),
    })
}

pub fn insert_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, name, price, image, description, category, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            service.id,
            service.name,
            service.price,
            service.image,
            service.description,
            service.category,
            service.created_by,
            ts(&service.created_at),
        ],
    )?;
    Ok(())
}

/// Newest first. A missing or non-positive limit returns everything.
pub fn list_services(conn: &Connection, limit: Option<i64>) -> anyhow::Result<Vec<Service>> {
    let limit = limit.filter(|l| *l > 0).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC, rowid DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], parse_service_row)?;
    collect(rows)
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let service = conn
        .query_row(
            &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
            params![id],
            parse_service_row,
        )
        .optional()?;
    Ok(service)
}

pub fn update_service(conn: &Connection, id: &str, update: &ServiceUpdate) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE services SET
           name = COALESCE(?1, name),
           price = COALESCE(?2, price),
           image = COALESCE(?3, image),
           description = COALESCE(?4, description),
           category = COALESCE(?5, category)
         WHERE id = ?6",
        params![
            update.name,
            update.price,
            update.image,
            update.description,
            update.category,
            id,
        ],
    )?;
    Ok(count)
}

pub fn delete_service(conn: &Connection, id: &str) -> anyhow::Result<usize> {
    let count = conn.execute("DELETE FROM services WHERE id = ?1", params![id])?;
    Ok(count)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, user_email, user_name, service_id, service_name, service_image, \
     price, booking_date, location, payment_status, delivery_status, decorator_id, decorator_name, \
     decorator_email, tracking_id, decorator_cost, created_at, assigned_at, accepted_at, completed_at";

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let payment_status: String = row.get(9)?;
    let delivery_status: String = row.get(10)?;
    let created_at: String = row.get(16)?;

    Ok(Booking {
        id: row.get(0)?,
        user_email: row.get(1)?,
        user_name: row.get(2)?,
        service_id: row.get(3)?,
        service_name: row.get(4)?,
        service_image: row.get(5)?,
        price: RawPrice(row.get(6)?),
        booking_date: row.get(7)?,
        location: row.get(8)?,
        payment_status: PaymentStatus::parse(&payment_status),
        delivery_status: DeliveryStatus::parse(&delivery_status),
        decorator_id: row.get(11)?,
        decorator_name: row.get(12)?,
        decorator_email: row.get(13)?,
        tracking_id: row.get(14)?,
        decorator_cost: row.get(15)?,
        created_at: parse_ts(&created_at),
        assigned_at: parse_opt_ts(row.get(17)?),
        accepted_at: parse_opt_ts(row.get(18)?),
        completed_at: parse_opt_ts(row.get(19)?),
    })
}

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ),
        params![
            booking.id,
            booking.user_email,
            booking.user_name,
            booking.service_id,
            booking.service_name,
            booking.service_image,
            booking.price.as_str(),
            booking.booking_date,
            booking.location,
            booking.payment_status.as_str(),
            booking.delivery_status.as_str(),
            booking.decorator_id,
            booking.decorator_name,
            booking.decorator_email,
            booking.tracking_id,
            booking.decorator_cost,
            ts(&booking.created_at),
            booking.assigned_at.as_ref().map(ts),
            booking.accepted_at.as_ref().map(ts),
            booking.completed_at.as_ref().map(ts),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            parse_booking_row,
        )
        .optional()?;
    Ok(booking)
}

pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> anyhow::Result<Vec<Booking>> {
    let mut clauses: Vec<String> = vec![];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    let conditions = [
        ("user_email", &filter.email),
        ("payment_status", &filter.payment_status),
        ("delivery_status", &filter.delivery_status),
    ];
    for (column, value) in conditions {
        if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
            values.push(Box::new(value.clone()));
            clauses.push(format!("{column} = ?{}", values.len()));
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings {where_sql} ORDER BY created_at DESC, rowid DESC"
    ))?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), parse_booking_row)?;
    collect(rows)
}

pub fn list_decorator_bookings(conn: &Connection, decorator_email: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE decorator_email = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![decorator_email], parse_booking_row)?;
    collect(rows)
}

pub fn list_decorator_earnings(conn: &Connection, decorator_email: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE decorator_email = ?1 AND delivery_status = 'completed'
         ORDER BY completed_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![decorator_email], parse_booking_row)?;
    collect(rows)
}

/// Customer edits. Only applies while the booking is still unpaid.
pub fn update_booking_details(
    conn: &Connection,
    id: &str,
    update: &BookingUpdate,
) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE bookings SET
           user_name = COALESCE(?1, user_name),
           booking_date = COALESCE(?2, booking_date),
           location = COALESCE(?3, location),
           price = COALESCE(?4, price)
         WHERE id = ?5 AND payment_status = 'unpaid'",
        params![
            update.user_name,
            update.booking_date,
            update.location,
            update.price.as_ref().map(|p| p.as_str()),
            id,
        ],
    )?;
    Ok(count)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<usize> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count)
}

/// Writes the decorator onto the booking, provided its delivery status is
/// still `expected`.
pub fn assign_decorator(
    conn: &Connection,
    id: &str,
    expected: DeliveryStatus,
    decorator_id: &str,
    decorator_name: &str,
    decorator_email: &str,
    assigned_at: &NaiveDateTime,
) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE bookings SET
           decorator_id = ?1,
           decorator_name = ?2,
           decorator_email = ?3,
           assigned_at = ?4,
           delivery_status = ?5
         WHERE id = ?6 AND delivery_status = ?7",
        params![
            decorator_id,
            decorator_name,
            decorator_email,
            ts(assigned_at),
            DeliveryStatus::Assigned.as_str(),
            id,
            expected.as_str(),
        ],
    )?;
    Ok(count)
}

/// Moves the booking to `target`, stamping the matching timestamp column.
/// Guarded on the status the caller validated against.
pub fn advance_delivery(
    conn: &Connection,
    id: &str,
    expected: DeliveryStatus,
    target: DeliveryStatus,
    at: &NaiveDateTime,
    decorator_cost: Option<f64>,
) -> anyhow::Result<usize> {
    let stamp_column = match target {
        DeliveryStatus::Assigned => "assigned_at",
        DeliveryStatus::AcceptedDecorator => "accepted_at",
        DeliveryStatus::Completed => "completed_at",
        DeliveryStatus::Pending | DeliveryStatus::PendingPickup => {
            anyhow::bail!("{} is not a decorator-driven status", target.as_str())
        }
    };

    let count = conn.execute(
        &format!(
            "UPDATE bookings SET
               delivery_status = ?1,
               {stamp_column} = ?2,
               decorator_cost = COALESCE(?3, decorator_cost)
             WHERE id = ?4 AND delivery_status = ?5"
        ),
        params![target.as_str(), ts(at), decorator_cost, id, expected.as_str()],
    )?;
    Ok(count)
}

/// Flips an unpaid booking to paid and hands it to pickup. Bookings that are
/// already paid are left untouched, so this applies at most once.
pub fn mark_booking_paid(conn: &Connection, id: &str, tracking_id: &str) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE bookings SET
           payment_status = 'paid',
           tracking_id = ?1,
           delivery_status = CASE WHEN delivery_status = 'pending' THEN 'pending-pickup' ELSE delivery_status END
         WHERE id = ?2 AND payment_status = 'unpaid'",
        params![tracking_id, id],
    )?;
    Ok(count)
}

// ── Payments ──

const PAYMENT_COLUMNS: &str = "id, transactional_id, customer_email, currency, amount, \
     payment_status, booking_id, service_id, service_name, service_image, tracking_id, paid_at";

fn parse_payment_row(row: &rusqlite::Row) -> rusqlite::Result<Payment> {
    let paid_at: String = row.get(11)?;
    Ok(Payment {
        id: row.get(0)?,
        transactional_id: row.get(1)?,
        customer_email: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        currency: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        amount: row.get(4)?,
        payment_status: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        booking_id: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        service_id: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        service_name: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        service_image: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        tracking_id: row.get(10)?,
        paid_at: parse_ts(&paid_at),
    })
}

/// Atomic insert-if-absent keyed on the gateway transaction id. Returns
/// `true` only for the call that actually wrote the row.
pub fn insert_payment_if_absent(conn: &Connection, payment: &Payment) -> anyhow::Result<bool> {
    let count = conn.execute(
        &format!(
            "INSERT INTO payments ({PAYMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(transactional_id) DO NOTHING"
        ),
        params![
            payment.id,
            payment.transactional_id,
            payment.customer_email,
            payment.currency,
            payment.amount,
            payment.payment_status,
            payment.booking_id,
            payment.service_id,
            payment.service_name,
            payment.service_image,
            payment.tracking_id,
            ts(&payment.paid_at),
        ],
    )?;
    Ok(count > 0)
}

pub fn get_payment_by_transaction(
    conn: &Connection,
    transactional_id: &str,
) -> anyhow::Result<Option<Payment>> {
    let payment = conn
        .query_row(
            &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE transactional_id = ?1"),
            params![transactional_id],
            parse_payment_row,
        )
        .optional()?;
    Ok(payment)
}

pub fn list_payments(conn: &Connection, email: Option<&str>) -> anyhow::Result<Vec<Payment>> {
    match email.filter(|e| !e.is_empty()) {
        Some(email) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments WHERE customer_email = ?1
                 ORDER BY paid_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![email], parse_payment_row)?;
            collect(rows)
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY paid_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], parse_payment_row)?;
            collect(rows)
        }
    }
}

pub fn count_payments_for_transaction(conn: &Connection, transactional_id: &str) -> anyhow::Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM payments WHERE transactional_id = ?1",
        params![transactional_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn user(id: &str, email: &str, name: &str, role: Role, status: UserStatus) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            photo_url: None,
            role,
            status,
            created_at: now(),
        }
    }

    fn booking(id: &str, email: &str) -> Booking {
        Booking {
            id: id.to_string(),
            user_email: email.to_string(),
            user_name: None,
            service_id: "svc-1".to_string(),
            service_name: Some("Wedding stage".to_string()),
            service_image: None,
            price: RawPrice("500".to_string()),
            booking_date: None,
            location: None,
            payment_status: PaymentStatus::Unpaid,
            delivery_status: DeliveryStatus::Pending,
            decorator_id: None,
            decorator_name: None,
            decorator_email: None,
            tracking_id: None,
            decorator_cost: None,
            created_at: now(),
            assigned_at: None,
            accepted_at: None,
            completed_at: None,
        }
    }

    fn payment(id: &str, transactional_id: &str, tracking_id: &str) -> Payment {
        Payment {
            id: id.to_string(),
            transactional_id: transactional_id.to_string(),
            customer_email: "alice@example.com".to_string(),
            currency: "usd".to_string(),
            amount: 500.0,
            payment_status: "paid".to_string(),
            booking_id: "b-1".to_string(),
            service_id: "svc-1".to_string(),
            service_name: "Wedding stage".to_string(),
            service_image: String::new(),
            tracking_id: tracking_id.to_string(),
            paid_at: now(),
        }
    }

    #[test]
    fn test_insert_user_rejects_duplicate_email() {
        let conn = setup_db();
        let first = user("u-1", "alice@example.com", "Alice", Role::User, UserStatus::None);
        let second = user("u-2", "alice@example.com", "Alice Again", Role::User, UserStatus::None);

        assert!(insert_user(&conn, &first).unwrap());
        assert!(!insert_user(&conn, &second).unwrap());
        assert_eq!(get_user_by_email(&conn, "alice@example.com").unwrap().unwrap().id, "u-1");
    }

    #[test]
    fn test_search_users_is_case_insensitive_and_sorted() {
        let conn = setup_db();
        insert_user(&conn, &user("u-1", "bob@example.com", "Bob", Role::User, UserStatus::None)).unwrap();
        insert_user(&conn, &user("u-2", "amy@example.com", "Amy", Role::User, UserStatus::None)).unwrap();
        insert_user(&conn, &user("u-3", "carl@other.org", "Carl", Role::User, UserStatus::None)).unwrap();

        let found = search_users(&conn, "EXAMPLE", false).unwrap();
        let names: Vec<_> = found.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Bob"]);

        let all_desc = search_users(&conn, "", true).unwrap();
        let names: Vec<_> = all_desc.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Carl", "Bob", "Amy"]);

        assert!(search_users(&conn, "%", false).unwrap().is_empty());
    }

    #[test]
    fn test_active_decorators_only() {
        let conn = setup_db();
        insert_user(&conn, &user("d-1", "d1@example.com", "Dee", Role::Decorator, UserStatus::Active)).unwrap();
        insert_user(&conn, &user("d-2", "d2@example.com", "Dan", Role::Decorator, UserStatus::Assigned)).unwrap();
        insert_user(&conn, &user("u-1", "u@example.com", "Uma", Role::User, UserStatus::Active)).unwrap();

        let decorators = list_active_decorators(&conn).unwrap();
        assert_eq!(decorators.len(), 1);
        assert_eq!(decorators[0].id, "d-1");
    }

    #[test]
    fn test_list_bookings_filters() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b-1", "alice@example.com")).unwrap();
        insert_booking(&conn, &booking("b-2", "bob@example.com")).unwrap();
        mark_booking_paid(&conn, "b-2", "PRCL-20250101-ABCDEF").unwrap();

        let alice = list_bookings(
            &conn,
            &BookingFilter {
                email: Some("alice@example.com".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(alice.len(), 1);

        let pickup = list_bookings(
            &conn,
            &BookingFilter {
                payment_status: Some("paid".to_string()),
                delivery_status: Some("pending-pickup".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(pickup.len(), 1);
        assert_eq!(pickup[0].id, "b-2");

        assert_eq!(list_bookings(&conn, &BookingFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_mark_booking_paid_applies_once() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b-1", "alice@example.com")).unwrap();

        assert_eq!(mark_booking_paid(&conn, "b-1", "PRCL-20250101-AAAAAA").unwrap(), 1);
        assert_eq!(mark_booking_paid(&conn, "b-1", "PRCL-20250101-BBBBBB").unwrap(), 0);

        let stored = get_booking(&conn, "b-1").unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.delivery_status, DeliveryStatus::PendingPickup);
        assert_eq!(stored.tracking_id.as_deref(), Some("PRCL-20250101-AAAAAA"));
    }

    #[test]
    fn test_insert_payment_if_absent_is_keyed_on_transaction() {
        let conn = setup_db();
        assert!(insert_payment_if_absent(&conn, &payment("p-1", "pi_123", "PRCL-1")).unwrap());
        assert!(!insert_payment_if_absent(&conn, &payment("p-2", "pi_123", "PRCL-2")).unwrap());

        assert_eq!(count_payments_for_transaction(&conn, "pi_123").unwrap(), 1);
        let stored = get_payment_by_transaction(&conn, "pi_123").unwrap().unwrap();
        assert_eq!(stored.tracking_id, "PRCL-1");
    }

    #[test]
    fn test_advance_delivery_guards_expected_status() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b-1", "alice@example.com")).unwrap();

        let moved = advance_delivery(
            &conn,
            "b-1",
            DeliveryStatus::Assigned,
            DeliveryStatus::AcceptedDecorator,
            &now(),
            None,
        )
        .unwrap();
        assert_eq!(moved, 0);
        assert_eq!(
            get_booking(&conn, "b-1").unwrap().unwrap().delivery_status,
            DeliveryStatus::Pending
        );
    }

    #[test]
    fn test_update_booking_details_only_while_unpaid() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b-1", "alice@example.com")).unwrap();

        let update = BookingUpdate {
            location: Some("Dhaka".to_string()),
            ..Default::default()
        };
        assert_eq!(update_booking_details(&conn, "b-1", &update).unwrap(), 1);

        mark_booking_paid(&conn, "b-1", "PRCL-20250101-AAAAAA").unwrap();
        let update = BookingUpdate {
            location: Some("Chittagong".to_string()),
            ..Default::default()
        };
        assert_eq!(update_booking_details(&conn, "b-1", &update).unwrap(), 0);
        assert_eq!(
            get_booking(&conn, "b-1").unwrap().unwrap().location.as_deref(),
            Some("Dhaka")
        );
    }

    #[test]
    fn test_list_services_limit() {
        let conn = setup_db();
        for i in 0..3 {
            insert_service(
                &conn,
                &Service {
                    id: format!("s-{i}"),
                    name: format!("Service {i}"),
                    price: 100.0,
                    image: None,
                    description: None,
                    category: None,
                    created_by: None,
                    created_at: now(),
                },
            )
            .unwrap();
        }

        assert_eq!(list_services(&conn, Some(2)).unwrap().len(), 2);
        assert_eq!(list_services(&conn, None).unwrap().len(), 3);
        assert_eq!(list_services(&conn, Some(0)).unwrap().len(), 3);
        assert_eq!(list_services(&conn, None).unwrap()[0].id, "s-2");
    }
}
