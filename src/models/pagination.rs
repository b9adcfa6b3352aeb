use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::normalize_list;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

/// Sort field and direction forwarded to the backend as `ordenarPor`/`direcao`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        SortSpec {
            column: sort.map(str::trim).unwrap_or("").to_string(),
            dir: if dir == Some("asc") { SortDir::Asc } else { SortDir::Desc },
        }
    }

    pub fn dir_str(&self) -> &'static str {
        match self.dir {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn toggle_dir(&self) -> &'static str {
        match self.dir {
            SortDir::Asc => "desc",
            SortDir::Desc => "asc",
        }
    }
}

/// A page request: 1-based page number, fixed page size, optional sort.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub pagina: u32,
    pub tamanho_pagina: u32,
    pub sort: SortSpec,
}

impl PageRequest {
    pub fn new(pagina: u32, tamanho_pagina: u32) -> Self {
        Self {
            pagina: pagina.max(1),
            tamanho_pagina: tamanho_pagina.max(1),
            sort: SortSpec::default(),
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("pagina".to_string(), self.pagina.to_string()),
            ("tamanhoPagina".to_string(), self.tamanho_pagina.to_string()),
        ];
        if !self.sort.column.is_empty() {
            params.push(("ordenarPor".to_string(), self.sort.column.clone()));
            params.push(("direcao".to_string(), self.sort.dir_str().to_string()));
        }
        params
    }
}

/// `ceil(total_items / page_size)`; zero when the page size is zero.
/// Saturates at `u32::MAX`.
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total_items.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub itens: Vec<T>,
    pub pagina: u32,
    pub tamanho_pagina: u32,
    pub total_itens: u64,
    pub total_paginas: u32,
}

impl<T: DeserializeOwned> Page<T> {
    /// Decode a paged response. Items go through the envelope normalizer;
    /// the server-declared total wins over the local item count, and a
    /// server-declared page count wins over the computed one.
    pub fn from_response(value: &Value, request: &PageRequest) -> Self {
        let itens: Vec<T> = normalize_list(value);
        let total_itens = declared_u64(value, &["totalItens", "totalItems", "total", "totalCount"])
            .unwrap_or(itens.len() as u64);
        let total_paginas = declared_u64(value, &["totalPaginas", "totalPages"])
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or_else(|| total_pages(total_itens, request.tamanho_pagina));
        let pagina = declared_u64(value, &["pagina", "page"])
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0)
            .unwrap_or(request.pagina);

        Page {
            itens,
            pagina,
            tamanho_pagina: request.tamanho_pagina,
            total_itens,
            total_paginas,
        }
    }
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.pagina > 1
    }

    pub fn has_next(&self) -> bool {
        self.pagina < self.total_paginas
    }
}

fn declared_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    let object = value.as_object()?;
    keys.iter().find_map(|k| object.get(*k).and_then(Value::as_u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn page_prefers_declared_total() {
        let value = json!({"itens": [1, 2, 3], "totalItens": 25});
        let page: Page<i64> = Page::from_response(&value, &PageRequest::new(1, 12));
        assert_eq!(page.itens, vec![1, 2, 3]);
        assert_eq!(page.total_itens, 25);
        assert_eq!(page.total_paginas, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn page_falls_back_to_local_length() {
        let value = json!([1, 2, 3, 4, 5]);
        let page: Page<i64> = Page::from_response(&value, &PageRequest::new(1, 2));
        assert_eq!(page.total_itens, 5);
        assert_eq!(page.total_paginas, 3);
    }

    #[test]
    fn declared_page_count_wins() {
        let value = json!({"items": [], "totalItems": 30, "totalPages": 4, "page": 2});
        let page: Page<i64> = Page::from_response(&value, &PageRequest::new(1, 12));
        assert_eq!(page.total_paginas, 4);
        assert_eq!(page.pagina, 2);
    }

    #[test]
    fn out_of_range_declared_counts_are_ignored() {
        let value = json!({
            "itens": [1],
            "totalItens": 25,
            "totalPaginas": 4_294_967_296u64,
            "pagina": 8_589_934_594u64
        });
        let page: Page<i64> = Page::from_response(&value, &PageRequest::new(2, 12));
        assert_eq!(page.total_paginas, 3);
        assert_eq!(page.pagina, 2);
        assert_eq!(total_pages(u64::MAX, 1), u32::MAX);
    }

    #[test]
    fn sort_params_only_when_column_set() {
        let plain = PageRequest::new(0, 12).to_query_params();
        assert_eq!(
            plain,
            vec![
                ("pagina".to_string(), "1".to_string()),
                ("tamanhoPagina".to_string(), "12".to_string())
            ]
        );
        let sorted = PageRequest::new(2, 12)
            .with_sort(SortSpec::from_params(Some("createdAt"), Some("asc")))
            .to_query_params();
        assert!(sorted.contains(&("ordenarPor".to_string(), "createdAt".to_string())));
        assert!(sorted.contains(&("direcao".to_string(), "asc".to_string())));
    }
}
