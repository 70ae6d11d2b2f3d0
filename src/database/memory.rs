use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::gateway::{AuthProvider, AuthSession, Gateway, GatewayError, Identity};
use super::query_builder::{literal, Condition, Direction, Query};

/// In-process stand-in for the hosted store and its auth service.
///
/// Rows get a uuid `id` and a strictly increasing `created_at` when the
/// caller omits them, so newest-first ordering is deterministic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    auth: RwLock<Accounts>,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Map<String, Value>>>,
    clock: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Accounts {
    users: HashMap<String, Account>,
    tokens: HashMap<String, Identity>,
}

struct Account {
    password: String,
    identity: Identity,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows verbatim, bypassing id/timestamp defaults
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().await;
        let entries = tables.rows.entry(table.to_string()).or_default();
        entries.extend(rows.into_iter().filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        }));
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables
            .rows
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Register an account and hand back a live access token for it
    pub async fn create_user(&self, email: &str, password: &str) -> Result<(Identity, String), GatewayError> {
        let identity = self.sign_up(email, password, None).await?;
        let session = self.sign_in_with_password(email, password).await?;
        Ok((identity, session.access_token))
    }
}

impl Tables {
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now();
        let stamp = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(stamp);
        stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[async_trait]
impl Gateway for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Map<String, Value>> = tables
            .rows
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches(row, query)).collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            query
                .ordering()
                .iter()
                .map(|order| {
                    let ordering = compare(a.get(&order.column), b.get(&order.column));
                    match order.direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let limit = query.row_limit().unwrap_or(usize::MAX);
        Ok(rows.into_iter().take(limit).cloned().map(Value::Object).collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        let mut tables = self.tables.write().await;
        let mut stored = Vec::with_capacity(rows.len());

        for row in rows {
            let Value::Object(mut map) = row else {
                return Err(GatewayError::Rejected {
                    status: 400,
                    message: format!("rows for {} must be JSON objects", table),
                });
            };
            if map.get("id").map_or(true, Value::is_null) {
                map.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
            }
            if map.get("created_at").map_or(true, Value::is_null) {
                let stamp = tables.next_timestamp();
                map.insert("created_at".into(), Value::String(stamp));
            }
            stored.push(map);
        }

        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());

        Ok(stored.into_iter().map(Value::Object).collect())
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, GatewayError> {
        if query.is_unfiltered() {
            return Err(GatewayError::Unfiltered("update"));
        }
        let Value::Object(patch) = patch else {
            return Err(GatewayError::Rejected {
                status: 400,
                message: "update patch must be a JSON object".to_string(),
            });
        };

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.rows.get_mut(table) {
            for row in rows.iter_mut().filter(|row| matches(row, query)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(Value::Object(row.clone()));
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        if query.is_unfiltered() {
            return Err(GatewayError::Unfiltered("delete"));
        }

        let mut tables = self.tables.write().await;
        let mut removed = Vec::new();
        if let Some(rows) = tables.rows.get_mut(table) {
            let (gone, kept): (Vec<_>, Vec<_>) = rows.drain(..).partition(|row| matches(row, query));
            *rows = kept;
            removed.extend(gone.into_iter().map(Value::Object));
        }
        Ok(removed)
    }
}

#[async_trait]
impl AuthProvider for MemoryStore {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        let mut accounts = self.auth.write().await;
        let identity = match accounts.users.get(&email.to_lowercase()) {
            Some(account) if account.password == password => account.identity.clone(),
            _ => {
                return Err(GatewayError::Rejected {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                })
            }
        };

        let token = Uuid::new_v4().simple().to_string();
        accounts.tokens.insert(token.clone(), identity.clone());

        Ok(AuthSession {
            access_token: token,
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            refresh_token: None,
            user: identity,
            extra: Map::new(),
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Identity, GatewayError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(GatewayError::Rejected {
                status: 400,
                message: "Signup requires a valid email and password".to_string(),
            });
        }

        let mut accounts = self.auth.write().await;
        let key = email.to_lowercase();
        if accounts.users.contains_key(&key) {
            return Err(GatewayError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let mut extra = Map::new();
        extra.insert("user_metadata".into(), json!({ "full_name": full_name }));
        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            extra,
        };
        accounts.users.insert(
            key,
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        Ok(identity)
    }

    async fn get_user(&self, token: &str) -> Result<Option<Identity>, GatewayError> {
        Ok(self.auth.read().await.tokens.get(token).cloned())
    }
}

fn matches(row: &Map<String, Value>, query: &Query) -> bool {
    query.conditions().iter().all(|condition| match condition {
        Condition::Eq(column, expected) => row.get(column).is_some_and(|v| loosely_equal(v, expected)),
        Condition::ILike(column, pattern) => row
            .get(column)
            .and_then(Value::as_str)
            .is_some_and(|text| like(&text.to_lowercase(), &pattern.to_lowercase())),
        Condition::In(column, options) => row
            .get(column)
            .is_some_and(|v| options.iter().any(|o| loosely_equal(v, o))),
    })
}

// Filters arrive as text on the wire, so 5 and "5" are the same key
fn loosely_equal(a: &Value, b: &Value) -> bool {
    !a.is_null() && literal(a) == literal(b)
}

/// SQL LIKE over chars; `*` is PostgREST's spelling of `%`
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '%' || pattern[p] == '*') {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && (pattern[p] == '%' || pattern[p] == '*') {
        p += 1;
    }
    p == pattern.len()
}

// Postgres ordering: NULL sorts after every value
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => literal(x).cmp(&literal(y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_fills_ids_and_increasing_timestamps() {
        let store = MemoryStore::new();
        let rows = store
            .insert("routines", vec![json!({"name": "A"}), json!({"name": "B"})])
            .await
            .unwrap();

        assert!(rows[0]["id"].is_string());
        assert!(rows[0]["created_at"].as_str().unwrap() < rows[1]["created_at"].as_str().unwrap());

        let newest = store
            .select("routines", &Query::new().order("created_at", Direction::Desc).limit(1))
            .await
            .unwrap();
        assert_eq!(newest[0]["name"], "B");
    }

    #[tokio::test]
    async fn filters_match_loosely_and_case_insensitively() {
        let store = MemoryStore::new();
        store
            .seed(
                "exercises",
                vec![
                    json!({"id": 1, "user_id": "u1", "name": "Press Banca"}),
                    json!({"id": 2, "user_id": "u2", "name": "press banca"}),
                    json!({"id": 3, "user_id": "u1", "name": "Remo"}),
                ],
            )
            .await;

        let found = store
            .select("exercises", &Query::new().eq("user_id", "u1").ilike("name", "PRESS BANCA"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], 1);

        let by_id = store.select("exercises", &Query::new().in_list("id", vec!["1", "3"])).await.unwrap();
        assert_eq!(by_id.len(), 2);
    }

    #[tokio::test]
    async fn delete_is_scoped_and_repeatable() {
        let store = MemoryStore::new();
        store
            .seed("routines", vec![json!({"id": "r1", "user_id": "u1"}), json!({"id": "r1", "user_id": "u2"})])
            .await;

        let query = Query::new().eq("id", "r1").eq("user_id", "u1");
        assert_eq!(store.delete("routines", &query).await.unwrap().len(), 1);
        assert_eq!(store.delete("routines", &query).await.unwrap().len(), 0);
        assert_eq!(store.rows("routines").await.len(), 1);
    }

    #[tokio::test]
    async fn tokens_resolve_to_their_identity() {
        let store = MemoryStore::new();
        let (identity, token) = store.create_user("ana@example.com", "secret").await.unwrap();

        assert_eq!(store.get_user(&token).await.unwrap(), Some(identity));
        assert_eq!(store.get_user("unknown").await.unwrap(), None);
        assert!(store.sign_in_with_password("ana@example.com", "wrong").await.is_err());
        assert!(store.sign_up("ANA@example.com", "x", None).await.is_err());
    }

    #[test]
    fn like_supports_both_wildcards() {
        assert!(like("press banca", "press%"));
        assert!(like("press banca", "*banca"));
        assert!(like("remo", "r_mo"));
        assert!(!like("remo", "rem"));
    }

    #[test]
    fn nulls_sort_last_ascending() {
        assert_eq!(compare(None, Some(&json!(1))), Ordering::Greater);
        assert_eq!(compare(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
    }
}
