//! Repository tests for `LdapStore` against the in-memory directory.

use roster_core::{
  Error, Membership, PageRequest, StudentPatch, StudentRecord, StudentStore, auth,
};

use crate::{Layout, LdapStore, MemoryDirectory, directory::Directory};

fn layout() -> Layout { Layout::new("dc=szuldpa-edu,dc=com", "students") }

fn student(n: u32) -> StudentRecord {
  StudentRecord::new(
    format!("student{n:03}"),
    format!("学生{n}"),
    "张",
    format!("student{n:03}@szuldpa-edu.com"),
  )
  .with_password("123456")
  .with_membership(Membership::class("计算机2021-1班"))
}

// ─── Add / exists ────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_then_exists() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);

  assert!(!store.exists("student001").await.unwrap());
  store.add(&student(1)).await.unwrap();
  assert!(store.exists("student001").await.unwrap());
}

#[tokio::test]
async fn add_twice_is_already_exists() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);

  store.add(&student(1)).await.unwrap();
  let err = store.add(&student(1)).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyExists(ref uid) if uid == "student001"));
}

#[tokio::test]
async fn add_rejects_empty_uid() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);

  let err = store.add(&StudentRecord::new("", "x", "y", "z")).await.unwrap_err();
  assert!(matches!(err, Error::InvalidRecord(_)));
  assert!(dir.is_empty());
}

#[tokio::test]
async fn refused_write_surfaces_as_directory_rejected() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  dir.refuse_writes_to(&layout.student_dn("student001"));
  let mut store = LdapStore::new(&mut dir, &layout);

  let err = store.add(&student(1)).await.unwrap_err();
  assert!(matches!(err, Error::DirectoryRejected(ref reason) if reason.contains("write refused")));
}

#[tokio::test]
async fn stored_entry_uses_wire_conventions() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  LdapStore::new(&mut dir, &layout).add(&student(1)).await.unwrap();

  let entry = dir
    .get("uid=student001,ou=students,dc=szuldpa-edu,dc=com")
    .expect("entry stored under the derived DN");
  assert_eq!(entry.first("description"), Some("班级: 计算机2021-1班"));
  assert_eq!(entry.first("userPassword"), Some("123456"));
  assert!(entry.has_value("objectClass", "inetOrgPerson"));
}

// ─── Search / delete ─────────────────────────────────────────────────────────

#[tokio::test]
async fn search_returns_full_record() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);

  store.add(&student(7)).await.unwrap();
  let found = store.search("student007").await.unwrap();
  assert_eq!(found, student(7));
}

#[tokio::test]
async fn search_missing_is_not_found() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  assert!(matches!(store.search("nobody").await, Err(Error::NotFound(_))));
  assert!(matches!(store.search("").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn delete_then_search_is_not_found() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);

  store.add(&student(1)).await.unwrap();
  store.delete("student001").await.unwrap();
  assert!(matches!(store.search("student001").await, Err(Error::NotFound(_))));
  assert!(!store.exists("student001").await.unwrap());
}

#[tokio::test]
async fn delete_missing_is_not_found() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  assert!(matches!(store.delete("ghost").await, Err(Error::NotFound(_))));
}

// ─── Modify ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn modify_mail_leaves_other_fields() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  store.add(&student(1)).await.unwrap();

  let patch = StudentPatch { mail: Some("new_email@szuldpa-edu.com".into()), ..Default::default() };
  store.modify("student001", &patch).await.unwrap();
  // Applying the same patch again changes nothing further.
  store.modify("student001", &patch).await.unwrap();

  let after = store.search("student001").await.unwrap();
  let mut expected = student(1);
  expected.mail = "new_email@szuldpa-edu.com".into();
  assert_eq!(after, expected);
}

#[tokio::test]
async fn modify_with_unassigned_clears_class() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  store.add(&student(1)).await.unwrap();

  let patch = StudentPatch { membership: Some(Membership::Unassigned), ..Default::default() };
  store.modify("student001", &patch).await.unwrap();

  assert_eq!(store.search("student001").await.unwrap().membership, Membership::Unassigned);
}

#[tokio::test]
async fn modify_changes_class() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  store.add(&student(1)).await.unwrap();

  let patch = StudentPatch { membership: Some(Membership::class("2022-3")), ..Default::default() };
  store.modify("student001", &patch).await.unwrap();

  let after = store.search("student001").await.unwrap();
  assert_eq!(after.membership.class_name(), Some("2022-3"));
  assert_eq!(after.cn, "学生1");
}

#[tokio::test]
async fn modify_missing_is_not_found() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  let patch = StudentPatch { cn: Some("x".into()), ..Default::default() };
  assert!(matches!(store.modify("ghost", &patch).await, Err(Error::NotFound(_))));
}

// ─── List ────────────────────────────────────────────────────────────────────

async fn seeded(dir: &mut MemoryDirectory, layout: &Layout, n: u32) {
  let mut store = LdapStore::new(dir, layout);
  store.ensure_org_units().await.unwrap();
  // Insert in reverse to check the listing order does not depend on it.
  for i in (1..=n).rev() {
    store.add(&student(i)).await.unwrap();
  }
}

#[tokio::test]
async fn list_pages_over_seventeen() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  seeded(&mut dir, &layout, 17).await;
  let mut store = LdapStore::new(&mut dir, &layout);

  let first = store.list(PageRequest::new(1, 8)).await.unwrap();
  assert_eq!(first.items.len(), 8);
  assert_eq!(first.total, 17);
  assert_eq!(first.total_pages, 3);
  assert!(first.has_next);
  assert!(!first.has_prev);
  assert_eq!(first.items[0].uid, "student001");

  let third = store.list(PageRequest::new(3, 8)).await.unwrap();
  assert_eq!(third.items.len(), 1);
  assert_eq!(third.items[0].uid, "student017");
  assert!(!third.has_next);
  assert!(third.has_prev);

  let fourth = store.list(PageRequest::new(4, 8)).await.unwrap();
  assert!(fourth.items.is_empty());
  assert!(!fourth.has_next);
  assert_eq!(fourth.total_pages, 3);
}

#[tokio::test]
async fn list_omits_passwords_and_decodes_membership() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  seeded(&mut dir, &layout, 2).await;
  let mut store = LdapStore::new(&mut dir, &layout);
  let admin = StudentRecord::new("admin", "管理员", "管", "admin@szuldpa-edu.com")
    .with_membership(Membership::Admin);
  store.add(&admin).await.unwrap();

  let page = store.list(PageRequest::default()).await.unwrap();
  assert_eq!(page.total, 3);
  assert!(page.items.iter().all(|r| r.password.is_none()));
  assert_eq!(page.items[0].membership, Membership::Admin);
  assert_eq!(page.items[1].membership.label(), "计算机2021-1班");
}

#[tokio::test]
async fn list_of_empty_directory() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  let page = store.list(PageRequest::default()).await.unwrap();
  assert_eq!(page.total, 0);
  assert_eq!(page.total_pages, 0);
  assert!(!page.has_next);
}

// ─── Organisational units ────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_org_units_is_idempotent() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);

  let created = store.ensure_org_units().await.unwrap();
  assert_eq!(created, vec!["students", "teachers", "classes"]);
  assert!(store.ensure_org_units().await.unwrap().is_empty());

  let ou = dir.get("ou=students,dc=szuldpa-edu,dc=com").unwrap();
  assert!(ou.has_value("objectClass", "organizationalUnit"));
}

#[tokio::test]
async fn org_units_are_not_listed_as_students() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  LdapStore::new(&mut dir, &layout).ensure_org_units().await.unwrap();
  let found = dir
    .search(&layout.students_base(), crate::SearchScope::Subtree, "(objectClass=inetOrgPerson)", &[])
    .await
    .unwrap();
  assert!(found.is_empty());
}

// ─── Authentication helpers ──────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_against_stored_password() {
  let (mut dir, layout) = (MemoryDirectory::new(), layout());
  let mut store = LdapStore::new(&mut dir, &layout);
  store.add(&student(1).with_password("b'secret'")).await.unwrap();

  assert!(auth::authenticate(&mut store, "student001", "secret").await.unwrap());
  assert!(!auth::authenticate(&mut store, "student001", "123456").await.unwrap());
  assert!(!auth::is_admin(&mut store, "student001").await.unwrap());
}
