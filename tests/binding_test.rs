use std::collections::HashMap;
use std::sync::Arc;

use request_binder::{
    bindable, decodable, BindError, BindErrorKind, Binder, BinderConfig, BindingSource,
    Capabilities, Decode, DecodeError, FileMap, UploadedFile, ValueMap,
};
use serde_json::Value;

fn values(pairs: &[(&str, &str)]) -> ValueMap {
    let mut map = ValueMap::new();
    for (key, value) in pairs {
        map.entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    map
}

fn bind<T: request_binder::Bindable>(
    dest: &mut T,
    source: BindingSource,
    data: &ValueMap,
) -> Result<(), BindError> {
    Binder::default().bind_values(dest, source, data, &FileMap::new())
}

// --- scalars ---

#[derive(Debug, Default)]
struct Scalars {
    count: i32,
    ratio: f64,
    enabled: bool,
    label: String,
    small: u8,
}

bindable! {
    Scalars {
        count(query = "count"),
        ratio(query = "ratio"),
        enabled(query = "enabled"),
        label(query = "label"),
        small(query = "small"),
    }
}

#[test]
fn scalars_are_coerced() {
    let mut dest = Scalars::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[
            ("count", "-12"),
            ("ratio", "0.25"),
            ("enabled", "True"),
            ("label", "hello"),
            ("small", "255"),
        ]),
    )
    .unwrap();

    assert_eq!(dest.count, -12);
    assert_eq!(dest.ratio, 0.25);
    assert!(dest.enabled);
    assert_eq!(dest.label, "hello");
    assert_eq!(dest.small, 255);
}

#[test]
fn empty_strings_bind_zero_values() {
    let mut dest = Scalars {
        count: 5,
        ratio: 1.5,
        enabled: true,
        label: "old".to_string(),
        small: 9,
    };
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[
            ("count", ""),
            ("ratio", ""),
            ("enabled", ""),
            ("label", ""),
            ("small", ""),
        ]),
    )
    .unwrap();

    assert_eq!(dest.count, 0);
    assert_eq!(dest.ratio, 0.0);
    assert!(!dest.enabled);
    assert_eq!(dest.label, "");
    assert_eq!(dest.small, 0);
}

#[test]
fn parse_failures_are_reported_verbatim() {
    let mut dest = Scalars::default();
    let err = bind(&mut dest, BindingSource::Query, &values(&[("small", "256")])).unwrap_err();

    assert!(matches!(err, BindError::ParseInt(_)));
    assert_eq!(err.to_string(), "256".parse::<u8>().unwrap_err().to_string());
    assert!(err.kind().is_client_error());
}

#[test]
fn keys_fall_back_to_case_insensitive_match() {
    let mut dest = Scalars::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("COUNT", "3"), ("Label", "x")]),
    )
    .unwrap();

    assert_eq!(dest.count, 3);
    assert_eq!(dest.label, "x");
}

#[test]
fn untagged_sources_leave_fields_alone() {
    let mut dest = Scalars::default();
    bind(&mut dest, BindingSource::Form, &values(&[("count", "3")])).unwrap();
    assert_eq!(dest.count, 0);
}

// --- optionals ---

#[derive(Debug, Default)]
struct Optionals {
    limit: Option<u32>,
    cursor: Option<String>,
}

bindable! {
    Optionals {
        limit(query = "limit"),
        cursor(query = "cursor"),
    }
}

#[test]
fn optionals_materialize_only_when_present() {
    let mut dest = Optionals::default();
    bind(&mut dest, BindingSource::Query, &values(&[("limit", "20")])).unwrap();

    assert_eq!(dest.limit, Some(20));
    assert_eq!(dest.cursor, None);
}

#[derive(Debug, Default)]
struct TooDeep {
    value: Option<Option<u32>>,
}

bindable! {
    TooDeep {
        value(query = "value"),
    }
}

#[test]
fn nested_optionals_are_rejected() {
    let mut dest = TooDeep::default();
    let err = bind(&mut dest, BindingSource::Query, &values(&[("value", "1")])).unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::NestedOptional);
    assert!(!err.kind().is_client_error());
}

// --- collections ---

#[derive(Debug, Default)]
struct Elements {
    elements: Vec<i32>,
    rgb: [u8; 3],
}

bindable! {
    Elements {
        elements(query = "elements", form = "elements"),
        rgb(query = "rgb"),
    }
}

#[test]
fn repeated_values_build_a_list() {
    let mut dest = Elements {
        elements: vec![7, 7, 7],
        ..Elements::default()
    };
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("elements", "1"), ("elements", "2")]),
    )
    .unwrap();

    assert_eq!(dest.elements, vec![1, 2]);
}

#[test]
fn indexed_notation_builds_a_list() {
    let mut dest = Elements::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("elements[0]", "1"), ("elements[1]", "2")]),
    )
    .unwrap();

    assert_eq!(dest.elements, vec![1, 2]);
}

#[test]
fn sparse_indices_fill_with_defaults() {
    let mut dest = Elements::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("elements[3]", "4"), ("elements[1]", "2")]),
    )
    .unwrap();

    assert_eq!(dest.elements, vec![0, 2, 0, 4]);
}

#[test]
fn index_above_maximum_is_rejected() {
    let mut dest = Elements::default();
    let err = bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("elements[1001]", "9")]),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        BindError::IndexExceedsMaximum {
            index: 1001,
            max: 1000,
            ..
        }
    ));
}

#[test]
fn index_at_maximum_is_accepted() {
    let mut dest = Elements::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("elements[1000]", "9")]),
    )
    .unwrap();

    assert_eq!(dest.elements.len(), 1001);
    assert_eq!(dest.elements[1000], 9);
}

#[test]
fn configured_maximum_index_applies() {
    let binder = Binder::new(BinderConfig::default().with_max_index(2));
    let mut dest = Elements::default();
    let err = binder
        .bind_values(
            &mut dest,
            BindingSource::Query,
            &values(&[("elements[3]", "1")]),
            &FileMap::new(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::IndexExceedsMaximum);
}

#[test]
fn fixed_arrays_take_indices_within_length() {
    let mut dest = Elements::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("rgb[0]", "10"), ("rgb[2]", "30")]),
    )
    .unwrap();
    assert_eq!(dest.rgb, [10, 0, 30]);

    let err = bind(&mut dest, BindingSource::Query, &values(&[("rgb[3]", "1")])).unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::IndexExceedsMaximum);
}

#[derive(Debug, Default)]
struct Order {
    items: Vec<Item>,
}

#[derive(Debug, Default, PartialEq)]
struct Item {
    name: String,
    qty: u32,
}

bindable! {
    Order {
        items(form = "items"),
    }
}

bindable! {
    Item {
        name(form = "name"),
        qty(form = "qty"),
    }
}

#[test]
fn indexed_notation_binds_lists_of_records() {
    let mut order = Order::default();
    bind(
        &mut order,
        BindingSource::Form,
        &values(&[
            ("items[0].name", "apple"),
            ("items[0].qty", "3"),
            ("items[1][name]", "pear"),
        ]),
    )
    .unwrap();

    assert_eq!(
        order.items,
        vec![
            Item {
                name: "apple".to_string(),
                qty: 3
            },
            Item {
                name: "pear".to_string(),
                qty: 0
            },
        ]
    );
}

// --- mappings ---

#[test]
fn mapping_of_values_keeps_first_value() {
    let mut dest: HashMap<String, Value> = HashMap::new();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("a", "1"), ("a", "2"), ("b", "x")]),
    )
    .unwrap();

    assert_eq!(dest["a"], Value::String("1".to_string()));
    assert_eq!(dest["b"], Value::String("x".to_string()));
}

#[test]
fn mapping_of_lists_keeps_every_value() {
    let mut dest: HashMap<String, Vec<String>> = HashMap::new();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("a", "1"), ("a", "2"), ("b", "x")]),
    )
    .unwrap();

    assert_eq!(dest["a"], vec!["1", "2"]);
    assert_eq!(dest["b"], vec!["x"]);
}

#[derive(Debug, Default)]
struct Labels {
    labels: HashMap<String, String>,
}

bindable! {
    Labels {
        labels(query = "label"),
    }
}

#[test]
fn bracket_keys_bind_mapping_fields() {
    let mut dest = Labels::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("label[env]", "prod"), ("label.tier", "web"), ("other", "x")]),
    )
    .unwrap();

    assert_eq!(dest.labels.len(), 2);
    assert_eq!(dest.labels["env"], "prod");
    assert_eq!(dest.labels["tier"], "web");
}

// --- nested records ---

#[derive(Debug, Default)]
struct Profile {
    user: Person,
    backup: Option<Address>,
}

#[derive(Debug, Default)]
struct Person {
    name: String,
    address: Address,
}

#[derive(Debug, Default, PartialEq)]
struct Address {
    city: String,
}

bindable! {
    Profile {
        user(form = "user"),
        backup(form = "backup"),
    }
}

bindable! {
    Person {
        name(form = "name"),
        address(form = "address"),
    }
}

bindable! {
    Address {
        city(form = "city"),
    }
}

#[test]
fn dot_notation_binds_nested_records() {
    let mut profile = Profile::default();
    bind(
        &mut profile,
        BindingSource::Form,
        &values(&[("user.name", "ada"), ("user.address.city", "London")]),
    )
    .unwrap();

    assert_eq!(profile.user.name, "ada");
    assert_eq!(profile.user.address.city, "London");
    assert_eq!(profile.backup, None);
}

#[test]
fn bracket_notation_binds_nested_records() {
    let mut profile = Profile::default();
    bind(
        &mut profile,
        BindingSource::Form,
        &values(&[
            ("user[name]", "ada"),
            ("user[address][city]", "London"),
            ("backup[city]", "Paris"),
        ]),
    )
    .unwrap();

    assert_eq!(profile.user.name, "ada");
    assert_eq!(profile.user.address.city, "London");
    assert_eq!(
        profile.backup,
        Some(Address {
            city: "Paris".to_string()
        })
    );
}

#[derive(Debug, Default)]
struct Outer {
    inner: Inner,
    page: u32,
}

#[derive(Debug, Default)]
struct Inner {
    term: String,
}

bindable! {
    Outer {
        inner,
        page(query = "page"),
    }
}

bindable! {
    Inner {
        term(query = "q"),
    }
}

#[test]
fn untagged_records_share_parent_keys() {
    let mut outer = Outer::default();
    bind(
        &mut outer,
        BindingSource::Query,
        &values(&[("q", "rust"), ("page", "2")]),
    )
    .unwrap();

    assert_eq!(outer.inner.term, "rust");
    assert_eq!(outer.page, 2);
}

// --- embedded records ---

#[derive(Debug, Default)]
struct Base {
    id: u64,
}

bindable! {
    Base {
        id(param = "id", query = "id"),
    }
}

#[derive(Debug, Default)]
struct Account {
    base: Base,
    extra: Option<Base>,
    name: String,
}

bindable! {
    Account {
        #[embedded] base,
        #[embedded] extra,
        name(query = "name"),
    }
}

#[test]
fn embedded_records_bind_as_parent_fields() {
    let mut account = Account::default();
    bind(
        &mut account,
        BindingSource::Query,
        &values(&[("id", "5"), ("name", "ada")]),
    )
    .unwrap();

    assert_eq!(account.base.id, 5);
    assert!(account.extra.is_none());
    assert_eq!(account.name, "ada");

    let mut account = Account {
        extra: Some(Base::default()),
        ..Account::default()
    };
    bind(&mut account, BindingSource::Path, &values(&[("id", "9")])).unwrap();
    assert_eq!(account.base.id, 9);
    assert_eq!(account.extra.map(|base| base.id), Some(9));
}

#[derive(Debug, Default)]
struct TaggedEmbed {
    base: Base,
}

bindable! {
    TaggedEmbed {
        #[embedded] base(query = "base"),
    }
}

#[test]
fn tagged_embedded_record_is_rejected() {
    let mut dest = TaggedEmbed::default();
    let err = bind(&mut dest, BindingSource::Query, &values(&[("id", "1")])).unwrap_err();

    assert!(matches!(err, BindError::TaggedEmbeddedField { field: "base" }));

    // Other sources do not see the tag.
    bind(&mut dest, BindingSource::Path, &values(&[("id", "1")])).unwrap();
    assert_eq!(dest.base.id, 1);
}

// --- destinations ---

#[test]
fn incompatible_destinations_depend_on_source() {
    let mut list: Vec<i32> = vec![1];
    bind(&mut list, BindingSource::Query, &values(&[("a", "2")])).unwrap();
    bind(&mut list, BindingSource::Path, &values(&[("a", "2")])).unwrap();
    bind(&mut list, BindingSource::Header, &values(&[("a", "2")])).unwrap();
    assert_eq!(list, vec![1]);

    let err = bind(&mut list, BindingSource::Form, &values(&[("a", "2")])).unwrap_err();
    assert!(matches!(
        err,
        BindError::IncompatibleDestination { found: "list" }
    ));
}

#[test]
fn empty_input_is_a_no_op() {
    let mut list: Vec<i32> = vec![1];
    bind(&mut list, BindingSource::Form, &ValueMap::new()).unwrap();
    assert_eq!(list, vec![1]);
}

// --- custom decoders ---

#[derive(Debug, Default)]
struct Tracer(String);

impl Decode for Tracer {
    fn capabilities() -> Capabilities {
        Capabilities {
            params: true,
            param: true,
            text: true,
        }
    }

    fn decode_params(&mut self, params: &[String]) -> Result<(), DecodeError> {
        self.0 = format!("params:{}", params.join(","));
        Ok(())
    }

    fn decode_param(&mut self, param: &str) -> Result<(), DecodeError> {
        self.0 = format!("param:{param}");
        Ok(())
    }

    fn decode_text(&mut self, text: &[u8]) -> Result<(), DecodeError> {
        self.0 = format!("text:{}", String::from_utf8_lossy(text));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Csv(Vec<String>);

impl Decode for Csv {
    fn capabilities() -> Capabilities {
        Capabilities::PARAM
    }

    fn decode_param(&mut self, param: &str) -> Result<(), DecodeError> {
        self.0 = param.split(',').map(str::to_string).collect();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Hex(u32);

impl Decode for Hex {
    fn capabilities() -> Capabilities {
        Capabilities::TEXT
    }

    fn decode_text(&mut self, text: &[u8]) -> Result<(), DecodeError> {
        let text = std::str::from_utf8(text).map_err(DecodeError::from_source)?;
        let digits = text.trim_start_matches('#');
        self.0 = u32::from_str_radix(digits, 16).map_err(DecodeError::from_source)?;
        Ok(())
    }
}

decodable!(Tracer, Csv, Hex);

#[derive(Debug, Default)]
struct Custom {
    tracer: Tracer,
    csv: Option<Csv>,
    colours: Vec<Hex>,
}

bindable! {
    Custom {
        tracer(query = "tracer"),
        csv(query = "csv"),
        colours(query = "colour"),
    }
}

#[test]
fn multi_value_decoder_takes_precedence() {
    let mut dest = Custom::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("tracer", "a"), ("tracer", "b")]),
    )
    .unwrap();

    assert_eq!(dest.tracer.0, "params:a,b");
}

#[test]
fn single_value_decoder_behind_optional() {
    let mut dest = Custom::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("csv", "x,y,z"), ("csv", "ignored")]),
    )
    .unwrap();

    assert_eq!(dest.csv.unwrap().0, vec!["x", "y", "z"]);
}

#[test]
fn text_decoder_for_list_elements() {
    let mut dest = Custom::default();
    bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("colour", "#ff0000"), ("colour", "00ff00")]),
    )
    .unwrap();

    let colours: Vec<u32> = dest.colours.iter().map(|hex| hex.0).collect();
    assert_eq!(colours, vec![0xff0000, 0x00ff00]);
}

#[test]
fn decoder_failures_abort_binding() {
    let mut dest = Custom::default();
    let err = bind(
        &mut dest,
        BindingSource::Query,
        &values(&[("colour", "zz")]),
    )
    .unwrap_err();

    assert_eq!(err.kind(), BindErrorKind::Decode);
    assert!(std::error::Error::source(&err).is_some());
}

// --- files ---

#[derive(Debug, Default)]
struct BareUpload {
    file: UploadedFile,
}

bindable! {
    BareUpload {
        file(form = "file"),
    }
}

#[derive(Debug, Default)]
struct Uploads {
    avatar: Option<Arc<UploadedFile>>,
    documents: Vec<UploadedFile>,
    scans: Vec<Arc<UploadedFile>>,
    title: String,
}

bindable! {
    Uploads {
        avatar(form = "avatar"),
        documents(form = "documents"),
        scans(form = "scans"),
        title(form = "title"),
    }
}

fn files(entries: &[(&str, &[&str])]) -> FileMap {
    entries
        .iter()
        .map(|(key, names)| {
            let uploaded = names
                .iter()
                .map(|name| Arc::new(UploadedFile::new(*name, name.as_bytes().to_vec())))
                .collect();
            (key.to_string(), uploaded)
        })
        .collect()
}

#[test]
fn bare_file_handle_is_rejected() {
    let mut dest = BareUpload::default();
    let err = Binder::default()
        .bind_values(
            &mut dest,
            BindingSource::Form,
            &ValueMap::new(),
            &files(&[("file", &["a.txt"])]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        BindError::UnsupportedFileDestination { field: "file" }
    ));
    assert!(!err.kind().is_client_error());
}

#[test]
fn optional_and_list_file_handles_are_assigned() {
    let mut dest = Uploads::default();
    Binder::default()
        .bind_values(
            &mut dest,
            BindingSource::Form,
            &values(&[("title", "holiday")]),
            &files(&[
                ("avatar", &["me.png"]),
                ("documents", &["a.pdf", "b.pdf"]),
                ("scans[1]", &["s1.png"]),
                ("scans[0]", &["s0.png"]),
            ]),
        )
        .unwrap();

    assert_eq!(dest.avatar.as_ref().unwrap().name(), "me.png");
    let documents: Vec<&str> = dest.documents.iter().map(UploadedFile::name).collect();
    assert_eq!(documents, vec!["a.pdf", "b.pdf"]);
    let scans: Vec<&str> = dest.scans.iter().map(|scan| scan.name()).collect();
    assert_eq!(scans, vec!["s0.png", "s1.png"]);
    assert_eq!(dest.title, "holiday");
}

#[test]
fn missing_upload_leaves_handle_empty() {
    let mut dest = Uploads::default();
    Binder::default()
        .bind_values(
            &mut dest,
            BindingSource::Form,
            &values(&[("title", "x")]),
            &files(&[("other", &["x.bin"])]),
        )
        .unwrap();

    assert!(dest.avatar.is_none());
    assert!(dest.documents.is_empty());
}
