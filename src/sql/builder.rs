//! Parameterized SELECT builder for listings. Identifiers are `&'static str` taken from
//! fixed allow-lists; user input only ever reaches the query as a bound value.

use super::params::PgBindValue;

/// How a filter compares its column with the bound value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Eq,
    /// `col ILIKE '%v%'`
    ILike,
    /// `LOWER(col) LIKE '%lower(v)%'`
    LowerLike,
    Gte,
    Lte,
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

#[derive(Clone, Debug)]
pub struct ListQuery {
    columns: &'static str,
    from: &'static str,
    conditions: Vec<String>,
    params: Vec<PgBindValue>,
    order: Vec<String>,
}

impl ListQuery {
    /// `columns` is the SELECT list; `from` the table expression including joins.
    pub fn new(columns: &'static str, from: &'static str) -> Self {
        ListQuery {
            columns,
            from,
            conditions: Vec::new(),
            params: Vec::new(),
            order: Vec::new(),
        }
    }

    fn next_placeholder(&mut self, value: PgBindValue) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    pub fn filter(mut self, column: &'static str, op: Op, value: impl Into<PgBindValue>) -> Self {
        let value = value.into();
        let cond = match op {
            Op::Eq => format!("{} = {}", column, self.next_placeholder(value)),
            Op::Gte => format!("{} >= {}", column, self.next_placeholder(value)),
            Op::Lte => format!("{} <= {}", column, self.next_placeholder(value)),
            Op::ILike => {
                let pattern = like_pattern(&value, false);
                format!("{} ILIKE {}", column, self.next_placeholder(pattern))
            }
            Op::LowerLike => {
                let pattern = like_pattern(&value, true);
                format!("LOWER({}) LIKE {}", column, self.next_placeholder(pattern))
            }
        };
        self.conditions.push(cond);
        self
    }

    /// Adds the filter only when a value is present.
    pub fn filter_opt<V: Into<PgBindValue>>(self, column: &'static str, op: Op, value: Option<V>) -> Self {
        match value {
            Some(v) => self.filter(column, op, v),
            None => self,
        }
    }

    /// A fixed condition with no bound values, e.g. `p.state = 'Publicado'`.
    pub fn condition(mut self, sql: &'static str) -> Self {
        self.conditions.push(sql.to_string());
        self
    }

    /// A fixed condition with one bound value; `$?` marks where it goes.
    pub fn condition_with(mut self, template: &'static str, value: impl Into<PgBindValue>) -> Self {
        let ph = self.next_placeholder(value.into());
        self.conditions.push(template.replace("$?", &ph));
        self
    }

    pub fn order_by(mut self, column: &'static str, ascending: bool) -> Self {
        let dir = if ascending { "ASC" } else { "DESC" };
        self.order.push(format!("{} {}", column, dir));
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn select_sql(&self, limit: Option<i64>, offset: Option<i64>) -> QueryBuf {
        let mut params = self.params.clone();
        let mut sql = format!("SELECT {} FROM {}{}", self.columns, self.from, self.where_clause());
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        if let Some(limit) = limit {
            params.push(PgBindValue::I64(limit));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }
        if let Some(offset) = offset {
            params.push(PgBindValue::I64(offset));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }
        QueryBuf { sql, params }
    }

    pub fn count_sql(&self) -> QueryBuf {
        QueryBuf {
            sql: format!("SELECT COUNT(*) FROM {}{}", self.from, self.where_clause()),
            params: self.params.clone(),
        }
    }
}

fn like_pattern(value: &PgBindValue, lower: bool) -> PgBindValue {
    match value {
        PgBindValue::Text(s) => {
            let s = if lower { s.to_lowercase() } else { s.clone() };
            PgBindValue::Text(format!("%{}%", s))
        }
        other => other.clone(),
    }
}

/// Maps a user-supplied name onto the matching allow-listed identifier.
pub fn allowed(name: &str, allow_list: &'static [&'static str]) -> Option<&'static str> {
    allow_list.iter().copied().find(|c| *c == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_numbered_placeholders() {
        let q = ListQuery::new("r.id, r.name", "riders r")
            .filter("r.dni", Op::Eq, 40123456i64)
            .filter("r.name", Op::ILike, "juan")
            .order_by("r.last_name", true)
            .select_sql(Some(9), Some(18));
        assert_eq!(
            q.sql,
            "SELECT r.id, r.name FROM riders r WHERE r.dni = $1 AND r.name ILIKE $2 ORDER BY r.last_name ASC LIMIT $3 OFFSET $4"
        );
        assert_eq!(q.params[1], PgBindValue::Text("%juan%".into()));
        assert_eq!(q.params[3], PgBindValue::I64(18));
    }

    #[test]
    fn lower_like_and_templates() {
        let q = ListQuery::new("u.id", "users u")
            .filter("u.email", Op::LowerLike, "ANA")
            .condition_with("EXISTS (SELECT 1 FROM user_roles ur WHERE ur.user_id = u.id AND ur.role_id = $?)", 3i64)
            .count_sql();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM users u WHERE LOWER(u.email) LIKE $1 AND EXISTS (SELECT 1 FROM user_roles ur WHERE ur.user_id = u.id AND ur.role_id = $2)"
        );
        assert_eq!(q.params[0], PgBindValue::Text("%ana%".into()));
    }

    #[test]
    fn optional_filters_are_skipped() {
        let q = ListQuery::new("*", "contacts")
            .filter_opt::<String>("state", Op::Eq, None)
            .select_sql(None, None);
        assert_eq!(q.sql, "SELECT * FROM contacts");
        assert!(q.params.is_empty());
    }

    #[test]
    fn allow_list_lookup() {
        const COLS: &[&str] = &["name", "email"];
        assert_eq!(allowed("email", COLS), Some("email"));
        assert_eq!(allowed("email; DROP", COLS), None);
    }
}
