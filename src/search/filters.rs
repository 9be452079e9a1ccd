use rusqlite::types::ToSql;

/// Optional search criteria. Each one that is present narrows the result set;
/// all present criteria are AND-ed together.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    /// Substring of title, original title, overview or main cast.
    pub query: Option<String>,
    /// Substring of the joined `genres` text.
    pub genre: Option<String>,
    /// Exact, case-sensitive status.
    pub status: Option<String>,
    /// Lower bound on rating. Zero or less means no bound.
    pub min_rating: Option<f64>,
}

/// A compiled WHERE expression and its positional parameters.
///
/// Placeholders are numbered `?1..?N` in the order of `params`, so callers can
/// append their own parameters starting at `next_index()`.
pub struct Predicate {
    pub clauses: Vec<String>,
    pub params: Vec<Box<dyn ToSql>>,
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("clauses", &self.clauses)
            .field("params", &self.params.len())
            .finish()
    }
}

impl Predicate {
    /// `WHERE a AND b`, or an empty string when nothing filters.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Index the next appended placeholder should use.
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    fn push_param(&mut self, value: Box<dyn ToSql>) -> usize {
        self.params.push(value);
        self.params.len()
    }
}

impl Filters {
    /// Build the shared predicate used by both the window and the count query.
    pub fn compile(&self) -> Predicate {
        let mut pred = Predicate {
            clauses: Vec::new(),
            params: Vec::new(),
        };

        if let Some(q) = non_blank(&self.query) {
            let n = pred.push_param(Box::new(like_pattern(q)));
            pred.clauses.push(format!(
                "(title LIKE ?{n} ESCAPE '\\' OR original_title LIKE ?{n} ESCAPE '\\' \
                 OR overview LIKE ?{n} ESCAPE '\\' OR main_cast LIKE ?{n} ESCAPE '\\')"
            ));
        }

        if let Some(genre) = non_blank(&self.genre) {
            let n = pred.push_param(Box::new(like_pattern(genre)));
            pred.clauses.push(format!("genres LIKE ?{n} ESCAPE '\\'"));
        }

        if let Some(status) = non_blank(&self.status) {
            let n = pred.push_param(Box::new(status.to_string()));
            pred.clauses.push(format!("status = ?{n}"));
        }

        if let Some(min) = self.min_rating.filter(|m| m.is_finite() && *m > 0.0) {
            let n = pred.push_param(Box::new(min));
            pred.clauses.push(format!("rating >= ?{n}"));
        }

        pred
    }

    pub fn is_empty(&self) -> bool {
        self.compile().clauses.is_empty()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `%term%` with LIKE wildcards in `term` escaped so they match literally.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
