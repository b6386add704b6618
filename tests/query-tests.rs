use jsonpath_query::{
    jsonpath, node::PathStep, JSONPathError, Node, Query,
};
use serde_json::{json, Value};

fn users() -> Value {
    json!({
        "users": [
            {"name": "Sue", "score": 100},
            {"name": "John", "score": 86, "admin": true},
            {"name": "Sally", "score": 84, "admin": false},
            {"name": "Jane", "score": 55}
        ],
        "moderator": "John"
    })
}

/// Re-walk a node's location on the original document.
fn walk<'v>(doc: &'v Value, node: &Node) -> Option<&'v Value> {
    let mut value = doc;
    for step in node.location.steps() {
        value = match step {
            PathStep::Name(name) => value.get(name.as_str())?,
            PathStep::Index(index) => value.get(index)?,
        };
    }
    Some(value)
}

#[test]
fn filter_score_comparison() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$.users[?@.score > 85]", &doc)?;

    assert_eq!(
        nodes.values(),
        vec![
            &json!({"name": "Sue", "score": 100}),
            &json!({"name": "John", "score": 86, "admin": true}),
        ]
    );
    assert_eq!(nodes.get(0).unwrap().path(), "$['users'][0]");
    assert_eq!(nodes.get(1).unwrap().path(), "$['users'][1]");
    Ok(())
}

#[test]
fn wildcard_then_name() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$.users[*].name", &doc)?;
    assert_eq!(
        nodes.values(),
        vec![&json!("Sue"), &json!("John"), &json!("Sally"), &json!("Jane")]
    );
    Ok(())
}

#[test]
fn descendant_name_in_document_order() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$..score", &doc)?;
    assert_eq!(
        nodes.values(),
        vec![&json!(100), &json!(86), &json!(84), &json!(55)]
    );
    Ok(())
}

#[test]
fn filter_boolean_comparison() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$.users[?@.admin == true]", &doc)?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes.first().unwrap().value.get("name"), Some(&json!("John")));
    Ok(())
}

#[test]
fn slice_from_negative_start() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$.users[-2:]", &doc)?;
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes.get(0).unwrap().path(), "$['users'][2]");
    assert_eq!(nodes.get(1).unwrap().path(), "$['users'][3]");
    Ok(())
}

#[test]
fn filter_with_match_function() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$.users[?match(@.name, 'S.*')]", &doc)?;
    let names: Vec<&Value> = nodes
        .iter()
        .map(|node| node.value.get("name").unwrap())
        .collect();
    assert_eq!(names, vec![&json!("Sue"), &json!("Sally")]);
    Ok(())
}

#[test]
fn union_keeps_order_and_duplicates() -> Result<(), JSONPathError> {
    let doc = json!({"a": [1, 2, 3]});
    let nodes = jsonpath::find("$.a[1, 1, 0]", &doc)?;
    assert_eq!(nodes.values(), vec![&json!(2), &json!(2), &json!(1)]);
    Ok(())
}

#[test]
fn locations_resolve_on_the_document() -> Result<(), JSONPathError> {
    let doc = users();
    for query in [
        "$.users[?@.score > 85]",
        "$.users[*].name",
        "$..score",
        "$.users[-2:]",
        "$..*",
    ] {
        for node in jsonpath::find(query, &doc)?.iter() {
            let resolved = walk(&doc, node).expect("location did not resolve");
            assert_eq!(resolved, node.value, "{}", query);
        }
    }
    Ok(())
}

#[test]
fn normalized_paths_re_evaluate_to_singletons() -> Result<(), JSONPathError> {
    let doc = users();
    for node in jsonpath::find("$..*", &doc)?.iter() {
        let singleton = jsonpath::find(&node.path(), &doc)?;
        assert_eq!(singleton.len(), 1, "{}", node.path());
        assert_eq!(singleton.first().unwrap().value, node.value);
        assert_eq!(singleton.first().unwrap().path(), node.path());
    }
    Ok(())
}

#[test]
fn repeated_application_is_deterministic() -> Result<(), JSONPathError> {
    let doc = users();
    let query = Query::standard("$..[?@.score > 50]")?;

    let first = query.find(&doc);
    let second = query.find(&doc);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.value, b.value);
        assert_eq!(a.path(), b.path());
    }
    Ok(())
}

#[test]
fn descendant_visits_pre_order() -> Result<(), JSONPathError> {
    let doc = json!({"o": {"j": 1, "k": 2}, "a": [5, 3, [{"j": 4}, {"k": 6}]]});
    let nodes = jsonpath::find("$..j", &doc)?;
    assert_eq!(nodes.values(), vec![&json!(1), &json!(4)]);

    let paths: Vec<String> = jsonpath::find("$..*", &doc)?
        .iter()
        .map(|node| node.path())
        .collect();
    assert_eq!(
        paths,
        vec![
            "$['o']",
            "$['a']",
            "$['o']['j']",
            "$['o']['k']",
            "$['a'][0]",
            "$['a'][1]",
            "$['a'][2]",
            "$['a'][2][0]",
            "$['a'][2][1]",
            "$['a'][2][0]['j']",
            "$['a'][2][1]['k']",
        ]
    );
    Ok(())
}

#[test]
fn nothing_comparisons() -> Result<(), JSONPathError> {
    let doc = users();

    // A query for a missing member resolves to Nothing; Nothing equals
    // only Nothing, and never orders.
    assert!(jsonpath::find("$.users[?@.missing == 1]", &doc)?.is_empty());
    assert_eq!(jsonpath::find("$.users[?@.missing != 1]", &doc)?.len(), 4);
    assert!(jsonpath::find("$.users[?@.missing < 1]", &doc)?.is_empty());
    assert!(jsonpath::find("$.users[?@.missing > 1]", &doc)?.is_empty());
    assert!(jsonpath::find("$.users[?@.missing <= 1]", &doc)?.is_empty());
    assert!(jsonpath::find("$.users[?@.missing >= 1]", &doc)?.is_empty());
    assert_eq!(
        jsonpath::find("$.users[?@.missing == @.also_missing]", &doc)?.len(),
        4
    );
    Ok(())
}

#[test]
fn null_is_not_nothing() -> Result<(), JSONPathError> {
    let doc = json!({"a": [{"b": null}, {}]});
    assert_eq!(jsonpath::find("$.a[?@.b == null]", &doc)?.len(), 1);
    assert!(jsonpath::find("$.a[?@.missing == null]", &doc)?.is_empty());
    Ok(())
}

#[test]
fn numeric_equality_across_int_and_float() -> Result<(), JSONPathError> {
    let doc = json!({"a": [{"n": 1}, {"n": 1.0}, {"n": 1.5}]});
    assert_eq!(jsonpath::find("$.a[?@.n == 1]", &doc)?.len(), 2);
    assert_eq!(jsonpath::find("$.a[?@.n == 1.5]", &doc)?.len(), 1);
    assert_eq!(jsonpath::find("$.a[?@.n < 1.5]", &doc)?.len(), 2);
    Ok(())
}

#[test]
fn invalid_iregexp_patterns_are_false() -> Result<(), JSONPathError> {
    let doc = users();
    // An unbalanced group is not a valid I-Regexp; a lookahead is valid
    // PCRE but outside the I-Regexp profile. Both must degrade to false
    // rather than failing the application.
    assert!(jsonpath::find("$.users[?match(@.name, 'S(')]", &doc)?.is_empty());
    assert!(jsonpath::find("$.users[?search(@.name, '(?=S)')]", &doc)?.is_empty());
    Ok(())
}

#[test]
fn finditer_agrees_with_find() -> Result<(), JSONPathError> {
    let doc = users();
    let query = Query::standard("$..[?@.score > 80].name")?;

    let eager = query.find(&doc);
    let lazy: Vec<Node> = query.finditer(&doc).collect();

    assert_eq!(eager.len(), lazy.len());
    for (a, b) in eager.iter().zip(lazy.iter()) {
        assert_eq!(a.value, b.value);
        assert_eq!(a.path(), b.path());
    }
    Ok(())
}

#[test]
fn find_one_returns_the_first_node() -> Result<(), JSONPathError> {
    let doc = users();

    let node = jsonpath::find_one("$.users[*].name", &doc)?.expect("expected a match");
    assert_eq!(node.value, &json!("Sue"));
    assert_eq!(node.path(), "$['users'][0]['name']");

    assert!(jsonpath::find_one("$.users[?@.score > 1000]", &doc)?.is_none());
    Ok(())
}

#[test]
fn node_list_items_projection() -> Result<(), JSONPathError> {
    let doc = users();
    let items = jsonpath::find("$.users[0].name", &doc)?.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].0, "$['users'][0]['name']");
    assert_eq!(items[0].1, &json!("Sue"));
    Ok(())
}

#[test]
fn root_query_in_filter() -> Result<(), JSONPathError> {
    let doc = users();
    let nodes = jsonpath::find("$.users[?@.name == $.moderator]", &doc)?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes.first().unwrap().path(), "$['users'][1]");
    Ok(())
}

#[test]
fn filter_over_object_members() -> Result<(), JSONPathError> {
    let doc = json!({"a": {"x": {"flag": true}, "y": {"flag": false}, "z": {"flag": true}}});

    // A bare query is an existence test; `y` has a `flag` member even
    // though its value is false.
    let nodes = jsonpath::find("$.a[?@.flag]", &doc)?;
    assert_eq!(nodes.len(), 3);

    let nodes = jsonpath::find("$.a[?@.flag == true]", &doc)?;
    let paths: Vec<String> = nodes.iter().map(|node| node.path()).collect();
    assert_eq!(paths, vec!["$['a']['x']", "$['a']['z']"]);
    Ok(())
}

#[test]
fn length_and_count_functions() -> Result<(), JSONPathError> {
    let doc = json!({
        "rows": [
            {"tags": ["a", "b"], "title": "one"},
            {"tags": ["a"], "title": "two"},
            {"tags": [], "title": "threeee"}
        ]
    });

    assert_eq!(jsonpath::find("$.rows[?length(@.tags) == 2]", &doc)?.len(), 1);
    assert_eq!(jsonpath::find("$.rows[?length(@.title) > 3]", &doc)?.len(), 1);
    assert_eq!(jsonpath::find("$.rows[?count(@.tags[*]) == 1]", &doc)?.len(), 1);
    Ok(())
}

#[test]
fn compiled_queries_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Query>();
}

#[test]
fn scalar_current_node_comparison() -> Result<(), JSONPathError> {
    let doc = json!({"a": [3, 5, 1, 2, 4, 6]});
    let nodes = jsonpath::find("$.a[?@ > 3]", &doc)?;
    assert_eq!(nodes.values(), vec![&json!(5), &json!(4), &json!(6)]);
    Ok(())
}
