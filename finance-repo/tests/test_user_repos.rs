mod utils;

use finance_repo::transaction_repo::Filter;
use finance_repo::user_repo::{NewUser, UserRepoError, UserUpdate};
use rstest::rstest;
use utils::generator::NewTransactionGenerator;
use utils::test_user::TestUser;
use utils::RepoType;
use uuid::Uuid;

fn new_user() -> NewUser {
    NewUser::new(
        "Jane Doe".to_owned(),
        format!("test-user-{}@example.com", Uuid::new_v4()),
        "not a real hash".to_owned(),
    )
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_create_and_get_user(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;

    let new_user = new_user();
    let user = user_repo.create_user(new_user.clone()).await.unwrap();
    assert_eq!(user.name, new_user.name);
    assert_eq!(user.email, new_user.email);
    assert!(!user.admin);

    let inserted_user = user_repo.get_user(user.id).await.unwrap();
    assert_eq!(user, inserted_user);

    let by_email = user_repo.get_user_by_email(&user.email).await.unwrap();
    assert_eq!(Some(user.clone()), by_email);

    user_repo.delete_user(user.id).await.unwrap();
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_create_existing_email(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;

    let new_user = new_user();
    let user = user_repo.create_user(new_user.clone()).await.unwrap();

    let create_result = user_repo.create_user(new_user.clone()).await;
    assert!(matches!(
        create_result,
        Err(UserRepoError::EmailAlreadyExists(email)) if email == new_user.email
    ));

    let users_with_email = user_repo
        .get_all_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.email == new_user.email)
        .count();
    assert_eq!(1, users_with_email);

    user_repo.delete_user(user.id).await.unwrap();
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_get_all_users_in_creation_order(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;

    let first = TestUser::new(&user_repo).await;
    let second = TestUser::new(&user_repo).await;

    let ids: Vec<_> = user_repo
        .get_all_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .filter(|id| *id == first.id || *id == second.id)
        .collect();
    assert_eq!(vec![first.id, second.id], ids);

    first.delete().await;
    second.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_update_user(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;
    let user = TestUser::new(&user_repo).await;
    let before = user_repo.get_user(user.id).await.unwrap();

    let update = UserUpdate {
        name: "Renamed".to_owned(),
        email: format!("renamed-{}@example.com", Uuid::new_v4()),
        admin: true,
    };
    let updated = user_repo.update_user(user.id, update.clone()).await.unwrap();

    assert_eq!(before.id, updated.id);
    assert_eq!(update.name, updated.name);
    assert_eq!(update.email, updated.email);
    assert!(updated.admin);
    assert_eq!(before.password_hash, updated.password_hash);
    assert_eq!(before.created_at, updated.created_at);

    user.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_update_to_taken_email(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;
    let user1 = TestUser::new(&user_repo).await;
    let user2 = TestUser::new(&user_repo).await;

    let update = UserUpdate {
        name: "Renamed".to_owned(),
        email: user2.email.clone(),
        admin: false,
    };
    let result = user_repo.update_user(user1.id, update).await;
    assert!(matches!(result, Err(UserRepoError::EmailAlreadyExists(_))));

    let stored = user_repo.get_user(user1.id).await.unwrap();
    assert_eq!(user1.email, stored.email);

    user1.delete().await;
    user2.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_update_invalid_user(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;

    let update = UserUpdate {
        name: "Nobody".to_owned(),
        email: format!("nobody-{}@example.com", Uuid::new_v4()),
        admin: false,
    };
    let result = user_repo.update_user(-1, update).await;
    assert!(matches!(result, Err(UserRepoError::UserNotFound(-1))));
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_delete_user_cascades(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, token_repo) = utils::build_repos(repo_type).await;
    let user = TestUser::new(&user_repo).await;
    let other = TestUser::new(&user_repo).await;

    let mut generator = NewTransactionGenerator::default();
    let mut transaction_ids = Vec::new();
    for new_transaction in generator.generate_many(5) {
        let transaction = transaction_repo
            .create_new_transaction(user.id, new_transaction)
            .await
            .unwrap();
        transaction_ids.push(transaction.id);
    }
    let other_transaction = transaction_repo
        .create_new_transaction(other.id, generator.generate())
        .await
        .unwrap();
    let token_id = Uuid::new_v4().to_string();
    token_repo.create_token(user.id, &token_id).await.unwrap();

    user_repo.delete_user(user.id).await.unwrap();

    assert!(matches!(
        user_repo.get_user(user.id).await,
        Err(UserRepoError::UserNotFound(_))
    ));
    for id in transaction_ids {
        assert!(transaction_repo.get_transaction(id).await.is_err());
    }
    assert!(transaction_repo
        .get_all_transactions(user.id, Filter::NONE)
        .await
        .unwrap()
        .is_empty());
    assert!(token_repo.get_token(&token_id).await.is_err());

    // other users keep their data
    assert!(transaction_repo
        .get_transaction(other_transaction.id)
        .await
        .is_ok());

    other.delete().await;
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[ignore = "requires a PostgreSQL database"]
#[case::sqlx(RepoType::SQLx)]
#[actix_rt::test]
async fn test_delete_invalid_user(#[case] repo_type: RepoType) {
    let (user_repo, _transaction_repo, _token_repo) = utils::build_repos(repo_type).await;

    let delete_result = user_repo.delete_user(-1).await;
    assert!(matches!(
        delete_result,
        Err(UserRepoError::UserNotFound(-1))
    ));
}
