//! Query builder and CSS conversion evaluated against an XHTML document.

mod common;

use common::{ids, Page, FORM_GRID};
use semloc::prelude::*;

fn run(page: &Page, locator: &Locator) -> Vec<String> {
    ids(&page.search().xpath(&locator.to_xpath().unwrap()))
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn class_attr_prefix_matches_nine_form_containers() {
    let page = Page::parse(FORM_GRID);
    let locator = Locator::build("div").with_class_attr("form-").unwrap();
    assert_eq!(locator.text(), ".//div[contains(@class, 'form-')]");
    assert_eq!(page.search().xpath(locator.text()).len(), 9);
}

#[test]
fn find_then_with_text() {
    let page = Page::parse(FORM_GRID);
    let alice = Locator::build("table#users")
        .find("tr")
        .unwrap()
        .with_text("Alice")
        .unwrap();
    assert_eq!(run(&page, &alice), ["row-alice"]);
}

#[test]
fn with_text_equals_is_exact() {
    let page = Page::parse(FORM_GRID);
    let bob = Locator::build("td").with_text_equals("Bob").unwrap();
    assert_eq!(run(&page, &bob), ["bob-name"]);
}

#[test]
fn attribute_predicates() {
    let page = Page::parse(FORM_GRID);
    let active = Locator::build("li").with_attr([("data-state", "active")]).unwrap();
    assert_eq!(run(&page, &active), ["step-2"]);

    let rows = Locator::build("tr").with_attr_starts_with("id", "row-").unwrap();
    assert_eq!(run(&page, &rows).len(), 4);

    let names = Locator::build("td").with_attr_ends_with("id", "-name").unwrap();
    assert_eq!(
        run(&page, &names),
        ["alice-name", "bob-name", "carol-name", "dave-name"]
    );

    let row_classes = Locator::build("div").with_attr_contains("class", "row").unwrap();
    assert_eq!(run(&page, &row_classes), ["r1", "r2"]);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn positions_count_from_both_ends() {
    let page = Page::parse(FORM_GRID);
    let rows = Locator::build("table#users").find("tr").unwrap();
    assert_eq!(run(&page, &rows.first().unwrap()), ["row-alice"]);
    assert_eq!(run(&page, &rows.at(2).unwrap()), ["row-bob"]);
    assert_eq!(run(&page, &rows.at(-2).unwrap()), ["row-carol"]);
    assert_eq!(run(&page, &rows.last().unwrap()), ["row-dave"]);
}

#[test]
fn positioned_locator_can_still_be_searched_into() {
    let page = Page::parse(FORM_GRID);
    let first_row_cells = Locator::build("tr").first().unwrap().find("td").unwrap();
    assert_eq!(run(&page, &first_row_cells).len(), 2);
}

#[test]
fn positioned_locator_rejects_predicates() {
    let first = Locator::build("tr").first().unwrap();
    assert!(matches!(
        first.with_text("Alice"),
        Err(LocatorError::RoundBrackets { operation: "with_text" })
    ));
    assert!(matches!(
        Locator::build("table").find(&first),
        Err(LocatorError::RoundBrackets { operation: "find" })
    ));
}

// ============================================================================
// Relations
// ============================================================================

#[test]
fn inside_after_before() {
    let page = Page::parse(FORM_GRID);
    let admin_cells = Locator::build("td").inside("tr.admin").unwrap();
    assert_eq!(run(&page, &admin_cells).len(), 4);

    let after_first = Locator::build("li").after("li#step-1").unwrap();
    assert_eq!(run(&page, &after_first), ["step-2", "step-3"]);

    let before_last = Locator::build("li").before("li#step-3").unwrap();
    assert_eq!(run(&page, &before_last), ["step-1", "step-2"]);
}

#[test]
fn child_and_descendant() {
    let page = Page::parse(FORM_GRID);
    let with_image = Locator::build("div").with_child("img").unwrap();
    assert_eq!(run(&page, &with_image), ["gallery"]);

    let with_cells = Locator::build("table").with_descendant("td#bob-name").unwrap();
    assert_eq!(run(&page, &with_cells), ["users"]);
}

#[test]
fn or_unions_in_document_order() {
    let page = Page::parse(FORM_GRID);
    let either = Locator::build("li#step-3").or("#g1").unwrap();
    assert_eq!(run(&page, &either), ["g1", "step-3"]);
}

#[test]
fn text_filter_applies_to_every_selector_in_a_group() {
    let page = Page::parse(FORM_GRID);
    let dave = Locator::build("td#bob-name, td#dave-name")
        .with_text("Dave")
        .unwrap();
    assert_eq!(run(&page, &dave), ["dave-name"]);
}

#[test]
fn find_with_group_stays_inside_receiver() {
    let page = Page::parse(FORM_GRID);
    let inside = Locator::build("ul#steps")
        .find("li#step-1, td#bob-name")
        .unwrap();
    assert_eq!(run(&page, &inside), ["step-1"]);
}

#[test]
fn empty_build_matches_everything_in_scope() {
    let page = Page::parse(FORM_GRID);
    let search = page.search();
    let empty_gallery = search.xpath("//*[@id='empty-gallery']");
    let found = Resolver::new(&search)
        .find_all(&Locator::build(""), SearchScope::Element(&empty_gallery[0]))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name().local_part(), "p");
}

// ============================================================================
// CSS conversion
// ============================================================================

#[test]
fn css_conversions_select_expected_elements() {
    let page = Page::parse(FORM_GRID);
    let search = page.search();
    let cases: &[(&str, &[&str])] = &[
        ("li:nth-child(2)", &["step-2"]),
        ("ul#steps > li:last-child", &["step-3"]),
        ("ul#steps > li:first-child", &["step-1"]),
        ("div:has(> img)", &["gallery"]),
        ("tr.admin:not(#row-alice)", &["row-carol"]),
        ("li[data-state=active]", &["step-2"]),
        ("li + li", &["step-2", "step-3"]),
        ("#step-1 ~ li", &["step-2", "step-3"]),
        ("tr:nth-child(odd)", &["row-alice", "row-carol"]),
        ("div.form-group.required", &["g3"]),
        ("td#bob-name, td#dave-name", &["bob-name", "dave-name"]),
    ];
    for (selector, expected) in cases {
        let xpath = css_to_xpath(selector).unwrap();
        assert_eq!(ids(&search.xpath(&xpath)), *expected, "{selector} => {xpath}");
    }
}
