//! A small shop catalog, end to end

use crate::common::*;
use serde_json::json;

struct Shop {
    kernel: MetadataKernel,
    store: std::sync::Arc<MemoryStore>,
    customer: Entity,
    order: Entity,
    name: Attribute,
    total: Attribute,
}

fn shop() -> Shop {
    let (kernel, store) = kernel();
    let customer = entity(&kernel, "shop", "Customer");
    let order = entity(&kernel, "shop", "order");
    let name = attribute(
        &kernel,
        &customer,
        "name",
        AttributeType::Text,
        Some(r#"{"mandatory":true,"maxLength":40}"#),
    );
    let total = attribute(
        &kernel,
        &order,
        "total",
        AttributeType::Integer,
        Some(r#"{"default":0,"minValue":0}"#),
    );
    Shop {
        kernel,
        store,
        customer,
        order,
        name,
        total,
    }
}

#[test]
fn declared_model_reads_back_normalized() {
    let shop = shop();
    assert_eq!(shop.customer.full_name(), "shop.customer");

    let customer = shop
        .kernel
        .entities()
        .find_by_full_name("SHOP.Customer")
        .unwrap();
    assert_eq!(customer.attributes.len(), 1);
    assert_eq!(customer.attributes[0].name, "name");
    // Each attribute bumps the owner's version
    assert_eq!(customer.version, Some(2));

    let listed = shop.kernel.entities().list_by_full_name("shop").unwrap();
    assert_eq!(listed.len(), 2);

    let err = shop
        .kernel
        .entities()
        .find_by_full_name("shop.invoice")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Entity not found: shop.invoice");
}

#[test]
fn instances_take_defaults_and_reject_bad_values() {
    let shop = shop();
    let ada = instance(&shop.kernel, &shop.customer, &[(&shop.name, json!("Ada"))]);
    assert_eq!(ada.value_of("name"), Some(&json!("Ada")));

    let order = shop
        .kernel
        .instances()
        .create(&Instance::new(shop.order.to_ref()).with_value(&shop.total, None))
        .unwrap();
    assert_eq!(order.value_of("total"), Some(&json!(0)));

    let err = shop
        .kernel
        .instances()
        .create(&Instance::new(shop.customer.to_ref()).with_value(&shop.name, None))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for the Instance. the value is mandatory"
    );

    let err = shop
        .kernel
        .instances()
        .create(&Instance::new(shop.order.to_ref()).with_value(&shop.total, Some(json!(-5))))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for the Instance. the value must be greater than or equal to 0"
    );

    let stats = shop.store.stats();
    assert_eq!(stats.entities, 2);
    assert_eq!(stats.instances, 2);
}

#[test]
fn relations_follow_their_type_through_a_tightening() {
    let shop = shop();
    let places = shop
        .kernel
        .relation_types()
        .create(
            &RelationType::new("places", shop.customer.to_ref(), shop.order.to_ref())
                .with_cardinalities(Cardinality::One, Cardinality::Many)
                .with_reverse_name("placed_by"),
        )
        .unwrap();
    assert_eq!(places.reverse_name.as_deref(), Some("placed_by"));
    let places_id = places.id.unwrap();

    let ada = instance(&shop.kernel, &shop.customer, &[(&shop.name, json!("Ada"))]);
    let bob = instance(&shop.kernel, &shop.customer, &[(&shop.name, json!("Bob"))]);
    let orders: Vec<Instance> = (0..3)
        .map(|i| instance(&shop.kernel, &shop.order, &[(&shop.total, json!(i * 10))]))
        .collect();

    let relations = shop.kernel.relations();
    let first = relations
        .create(&Relation::new(places_id, ada.to_ref(), orders[0].to_ref()))
        .unwrap();
    relations
        .create(&Relation::new(places_id, ada.to_ref(), orders[1].to_ref()))
        .unwrap();
    let bobs = relations
        .create(&Relation::new(places_id, bob.to_ref(), orders[2].to_ref()))
        .unwrap();
    assert_eq!(relations.list_by_source_instance(ada.id.unwrap()).unwrap().len(), 2);

    // Each customer may now place a single order
    let mut single = places.clone();
    single.target_cardinality = Some(Cardinality::One);
    let updated = shop.kernel.relation_types().update(&single).unwrap();
    assert_eq!(updated.version, Some(2));

    let kept: Vec<_> = relations
        .list_by_relation_type(places_id)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(kept, vec![first.id, bobs.id]);
}

#[test]
fn relation_to_a_deleted_instance_is_rejected() {
    let shop = shop();
    let places = shop
        .kernel
        .relation_types()
        .create(&RelationType::new(
            "places",
            shop.customer.to_ref(),
            shop.order.to_ref(),
        ))
        .unwrap();
    let ada = instance(&shop.kernel, &shop.customer, &[(&shop.name, json!("Ada"))]);
    let order = instance(&shop.kernel, &shop.order, &[(&shop.total, json!(1))]);
    shop.kernel.instances().delete(order.id.unwrap()).unwrap();

    let err = shop
        .kernel
        .relations()
        .create(&Relation::new(places.id.unwrap(), ada.to_ref(), order.to_ref()))
        .unwrap_err();
    assert_eq!(err, MetadataError::MissingTargetInstance);
}
