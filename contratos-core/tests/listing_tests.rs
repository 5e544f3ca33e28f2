//! Integration tests for the listing types.

use contratos_core::{FilterField, FilterSet, PagedResult, expected_total_pages};

#[test]
fn test_query_roundtrip_through_filter_set() {
    let query = "nome_cliente=Ana&tipo_plano=Pro&page=3";
    let set = FilterSet::from_query(query);
    assert_eq!(set.page(), 3);
    assert_eq!(set.text(FilterField::TipoPlano), Some("Pro"));
    assert_eq!(set.to_query(), query);
}

#[test]
fn test_permuted_construction_same_cache_key() {
    let pairs = [
        ("email_cliente", "x@y.com"),
        ("status", "Ativo"),
        ("page", "1"),
        ("limit", "20"),
    ];
    let forward = FilterSet::from_pairs(pairs).unwrap();
    let mut reversed = pairs;
    reversed.reverse();
    let backward = FilterSet::from_pairs(reversed).unwrap();

    assert_eq!(forward.cache_key(), backward.cache_key());
}

#[test]
fn test_total_pages_contract() {
    let page: PagedResult<()> = PagedResult {
        items: vec![],
        page: 3,
        limit: 20,
        total: 45,
        total_pages: 3,
    };
    assert_eq!(
        u64::from(page.total_pages),
        expected_total_pages(page.total, page.limit)
    );
    assert!(!page.pagination().can_go_forward());
    assert!(page.pagination().can_go_back());
}
