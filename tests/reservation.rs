mod common;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use common::{
    available_seats, create_travel_option, create_user, money, setup_db, setup_shared_db,
    NewTravelOption,
};
use travel_booking_backend::entities::booking::{self, BookingStatus};
use travel_booking_backend::entities::travel_option;
use travel_booking_backend::entities::user::UserRole;
use travel_booking_backend::services::reservation::{
    cancel_booking, reserve_seats, take_seats, CancelOutcome,
};
use travel_booking_backend::validation::ValidationError;
use travel_booking_backend::AppError;

#[tokio::test]
async fn booking_and_cancelling_round_trips_the_seat_count() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(&db, NewTravelOption::default()).await;

    let booking = reserve_seats(&db, user.id, option.id, 2).await.unwrap();

    assert_eq!(money(booking.total_price), Decimal::new(17998, 2));
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.number_of_seats, 2);
    assert_eq!(available_seats(&db, option.id).await, 198);

    let outcome = cancel_booking(&db, user.id, booking.id).await.unwrap();

    assert!(matches!(outcome, CancelOutcome::Cancelled(_)));
    assert_eq!(outcome.booking().status, BookingStatus::Cancelled);
    assert_eq!(available_seats(&db, option.id).await, 200);

    let stored = booking::Entity::find_by_id(booking.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn booking_every_remaining_seat_leaves_zero() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            seats: 4,
            ..Default::default()
        },
    )
    .await;

    reserve_seats(&db, user.id, option.id, 4).await.unwrap();

    assert_eq!(available_seats(&db, option.id).await, 0);
}

#[tokio::test]
async fn booking_one_seat_too_many_changes_nothing() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            seats: 4,
            ..Default::default()
        },
    )
    .await;

    let err = reserve_seats(&db, user.id, option.id, 5).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientSeats {
            requested: 5,
            available: 4
        }
    ));
    assert_eq!(available_seats(&db, option.id).await, 4);
    assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn non_positive_seat_counts_are_rejected() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(&db, NewTravelOption::default()).await;

    for seats in [0, -1] {
        let err = reserve_seats(&db, user.id, option.id, seats).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::NonPositiveSeats)
        ));
    }

    assert_eq!(available_seats(&db, option.id).await, 200);
    assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn departed_travel_options_cannot_be_booked() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            days_ahead: -1,
            ..Default::default()
        },
    )
    .await;

    let err = reserve_seats(&db, user.id, option.id, 1).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::AlreadyDeparted)
    ));
    assert_eq!(available_seats(&db, option.id).await, 200);
}

#[tokio::test]
async fn unknown_travel_option_is_not_found() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;

    let err = reserve_seats(&db, user.id, Uuid::new_v4(), 1).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn cancelling_twice_is_a_reported_no_op() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(&db, NewTravelOption::default()).await;

    let booking = reserve_seats(&db, user.id, option.id, 3).await.unwrap();
    cancel_booking(&db, user.id, booking.id).await.unwrap();

    let outcome = cancel_booking(&db, user.id, booking.id).await.unwrap();

    assert!(matches!(outcome, CancelOutcome::AlreadyCancelled(_)));
    assert_eq!(outcome.booking().status, BookingStatus::Cancelled);
    assert_eq!(available_seats(&db, option.id).await, 200);
}

#[tokio::test]
async fn bookings_of_other_users_are_not_found() {
    let db = setup_db().await;
    let owner = create_user(&db, "owner", UserRole::Traveller).await;
    let intruder = create_user(&db, "intruder", UserRole::Traveller).await;
    let option = create_travel_option(&db, NewTravelOption::default()).await;

    let booking = reserve_seats(&db, owner.id, option.id, 2).await.unwrap();

    let err = cancel_booking(&db, intruder.id, booking.id).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(available_seats(&db, option.id).await, 198);
    let stored = booking::Entity::find_by_id(booking.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn total_price_ignores_later_price_edits() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(&db, NewTravelOption::default()).await;

    let booking = reserve_seats(&db, user.id, option.id, 2).await.unwrap();

    let mut active: travel_option::ActiveModel = option.clone().into();
    active.price = Set(Decimal::new(12000, 2));
    active.update(&db).await.unwrap();

    let stored = booking::Entity::find_by_id(booking.id).one(&db).await.unwrap().unwrap();
    assert_eq!(money(stored.total_price), Decimal::new(17998, 2));

    // New bookings use the new price
    let later = reserve_seats(&db, user.id, option.id, 2).await.unwrap();
    assert_eq!(money(later.total_price), Decimal::new(24000, 2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_oversell() {
    let (_dir, db) = setup_shared_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            seats: 20,
            ..Default::default()
        },
    )
    .await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let db = db.clone();
            let (user_id, option_id) = (user.id, option.id);
            tokio::spawn(async move { reserve_seats(&db, user_id, option_id, 3).await })
        })
        .collect();

    let mut confirmed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(AppError::InsufficientSeats { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(confirmed, 6);
    assert_eq!(rejected, 4);
    assert_eq!(available_seats(&db, option.id).await, 2);

    let booked = booking::Entity::find()
        .filter(booking::Column::TravelOptionId.eq(option.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(booked, 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancels_return_seats_once() {
    let (_dir, db) = setup_shared_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            seats: 10,
            ..Default::default()
        },
    )
    .await;
    let booking = reserve_seats(&db, user.id, option.id, 4).await.unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let db = db.clone();
            let (user_id, booking_id) = (user.id, booking.id);
            tokio::spawn(async move { cancel_booking(&db, user_id, booking_id).await })
        })
        .collect();

    let mut cancelled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(CancelOutcome::Cancelled(_)) => cancelled += 1,
            Ok(CancelOutcome::AlreadyCancelled(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(cancelled, 1);
    assert_eq!(available_seats(&db, option.id).await, 10);
}

#[tokio::test]
async fn seat_update_rejects_a_stale_seat_count() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            seats: 5,
            ..Default::default()
        },
    )
    .await;

    // `option` still says 5 seats after this
    reserve_seats(&db, user.id, option.id, 4).await.unwrap();
    assert!(option.available_seats >= 3);

    let err = take_seats(&db, option.id, 3).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientSeats {
            requested: 3,
            available: 1
        }
    ));
    assert_eq!(available_seats(&db, option.id).await, 1);
}

#[tokio::test]
async fn totals_beyond_the_money_column_are_rejected() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            price: Decimal::new(60_000_000, 0),
            ..Default::default()
        },
    )
    .await;

    let err = reserve_seats(&db, user.id, option.id, 2).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::TotalTooLarge)
    ));
    assert_eq!(available_seats(&db, option.id).await, 200);
    assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn seat_count_stays_non_negative_through_mixed_traffic() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Traveller).await;
    let bob = create_user(&db, "bob", UserRole::Traveller).await;
    let option = create_travel_option(
        &db,
        NewTravelOption {
            seats: 5,
            ..Default::default()
        },
    )
    .await;

    let first = reserve_seats(&db, alice.id, option.id, 3).await.unwrap();
    assert!(reserve_seats(&db, bob.id, option.id, 3).await.is_err());
    reserve_seats(&db, bob.id, option.id, 2).await.unwrap();
    assert_eq!(available_seats(&db, option.id).await, 0);

    assert!(reserve_seats(&db, bob.id, option.id, 1).await.is_err());
    cancel_booking(&db, alice.id, first.id).await.unwrap();
    assert_eq!(available_seats(&db, option.id).await, 3);

    reserve_seats(&db, bob.id, option.id, 3).await.unwrap();
    assert_eq!(available_seats(&db, option.id).await, 0);
}

#[tokio::test]
async fn deleting_a_travel_option_removes_its_bookings() {
    let db = setup_db().await;
    let user = create_user(&db, "testuser", UserRole::Traveller).await;
    let option = create_travel_option(&db, NewTravelOption::default()).await;
    reserve_seats(&db, user.id, option.id, 1).await.unwrap();

    travel_option::Entity::delete_by_id(option.id).exec(&db).await.unwrap();

    assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
}
