//! Subcommand execution against an open directory session.

use std::io::BufRead as _;

use anyhow::{Context as _, bail};
use roster_core::{
  Membership, Page, PageRequest, StudentPatch, StudentRecord, StudentStore, auth,
};
use roster_store_ldap::{LdapSession, LdapStore, Layout};
use serde::Serialize;

use crate::Command;

pub async fn run(
  session: &mut LdapSession,
  layout: &Layout,
  command: Command,
  json: bool,
) -> anyhow::Result<()> {
  let mut store = LdapStore::new(session, layout);

  match command {
    Command::Init => {
      let created = store.ensure_org_units().await?;
      if json {
        return emit_json(&created);
      }
      if created.is_empty() {
        println!("all organisational units already present");
      }
      for ou in created {
        println!("created ou={ou}");
      }
    }

    Command::Add { uid, cn, sn, mail, password, class, admin } => {
      let record = StudentRecord::new(uid, cn, sn, mail)
        .with_password(password)
        .with_membership(membership_arg(class, admin).unwrap_or_default());
      store
        .add(&record)
        .await
        .with_context(|| format!("failed to add {}", record.uid))?;
      println!("added {}", record.uid);
    }

    Command::Show { uid } => {
      let record = store.search(&uid).await?;
      if json {
        return emit_json(&record);
      }
      print_record(&record);
    }

    Command::List { page, per_page } => {
      let page = store.list(PageRequest::new(page, per_page)).await?;
      if json {
        return emit_json(&page);
      }
      print_page(&page);
    }

    Command::Modify { uid, cn, sn, mail, password, class, admin } => {
      let patch = StudentPatch {
        cn,
        sn,
        mail,
        password,
        membership: membership_arg(class, admin),
      };
      if patch.is_empty() {
        bail!("nothing to modify; pass at least one field");
      }
      store
        .modify(&uid, &patch)
        .await
        .with_context(|| format!("failed to modify {uid}"))?;
      println!("modified {uid}");
    }

    Command::Delete { uid } => {
      store
        .delete(&uid)
        .await
        .with_context(|| format!("failed to delete {uid}"))?;
      println!("deleted {uid}");
    }

    Command::Import { file } => {
      let report = roster_import::import_file(&mut store, &file)
        .await
        .with_context(|| format!("failed to import {}", file.display()))?;
      if json {
        return emit_json(&report);
      }
      println!(
        "imported {} of {} rows ({} failed)",
        report.success_count,
        report.total(),
        report.failure_count
      );
      for f in &report.failures {
        let uid = f.uid.as_deref().unwrap_or("-");
        println!("  line {:>4}  {uid:<16} {}", f.line, f.reason);
      }
    }

    Command::Auth { uid } => {
      let candidate = read_password()?;
      if !auth::authenticate(&mut store, &uid, &candidate).await? {
        bail!("authentication failed for {uid}");
      }
      let name = auth::display_name(&mut store, &uid).await?;
      let admin = auth::is_admin(&mut store, &uid).await?;
      if json {
        return emit_json(&AuthOutcome { uid: &uid, name: &name, admin });
      }
      let role = if admin { "administrator" } else { "student" };
      println!("authenticated {name} ({uid}) as {role}");
    }
  }

  Ok(())
}

/// `--admin` wins; `--class ""` clears; neither leaves membership untouched.
fn membership_arg(class: Option<String>, admin: bool) -> Option<Membership> {
  if admin {
    Some(Membership::Admin)
  } else {
    class.map(Membership::class)
  }
}

fn read_password() -> anyhow::Result<String> {
  eprint!("password: ");
  let mut line = String::new();
  std::io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read password from stdin")?;
  Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[derive(Serialize)]
struct AuthOutcome<'a> {
  uid:   &'a str,
  name:  &'a str,
  admin: bool,
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn emit_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn print_record(record: &StudentRecord) {
  println!("uid:   {}", record.uid);
  println!("cn:    {}", record.cn);
  println!("sn:    {}", record.sn);
  println!("mail:  {}", record.mail);
  println!("class: {}", record.membership);
}

fn print_page(page: &Page<StudentRecord>) {
  for r in &page.items {
    println!("{:<16} {:<12} {:<32} {}", r.uid, r.cn, r.mail, r.membership);
  }
  println!(
    "page {}/{} · {} students",
    page.page,
    page.total_pages.max(1),
    page.total
  );
}
