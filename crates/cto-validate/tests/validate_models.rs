//! Integration test: validate instances against the sample namespaces under
//! `models/`, covering inheritance, cross-namespace references, enums,
//! relationships and field validators.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use cto_core::ValidationError;
use cto_introspect::{ImportValidation, ModelFile, ModelManager, ModelManagerOptions, ModelRegistry};
use cto_validate::{EngineConfig, Relationship, Resource, ResourceValidator, Value};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn load() -> ModelManager {
    let mut mm = ModelManager::new();
    mm.load_dir(repo_root().join("models"))
        .expect("Failed to load models/");
    mm
}

fn vehicle(vin: &str) -> Resource {
    Resource::new("org.acme", "Vehicle", vin).with("vin", vin)
}

fn car(vin: &str) -> Resource {
    Resource::new("org.acme", "Car", vin).with("vin", vin)
}

fn address(country: &str) -> Resource {
    Resource::concept("org.acme.base", "Address")
        .with("street", "1 High St")
        .with("city", "Leeds")
        .with("country", country)
}

fn person_ref(type_name: &str, email: &str) -> Value {
    Value::from(Relationship::new("org.acme.base", type_name, email))
}

fn garage(id: &str, parked: Vec<Value>) -> Resource {
    Resource::new("org.acme", "Garage", id)
        .with("garageId", id)
        .with("address", address("UK"))
        .with("parked", parked)
}

// -- Field shapes ------------------------------------------------------------

#[test]
fn test_vehicle_field_types() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);

    validator.validate_resource(&vehicle("1HG")).unwrap();
    validator
        .validate_resource(&vehicle("1HG").with("mileage", 12000))
        .unwrap();

    let err = validator
        .validate_resource(&vehicle("1HG").with("mileage", "12000"))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::FieldTypeViolation {
            resource_id: "org.acme.Vehicle#1HG".to_string(),
            property: "mileage".to_string(),
            expected_type: "Integer".to_string(),
            value: "\"12000\"".to_string(),
            actual_type: "string".to_string(),
        }
    );
}

#[test]
fn test_undeclared_field_rejected() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&vehicle("1HG").with("mileage", 12000).with("color", "red"))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::UndeclaredField {
            resource_id: "org.acme.Vehicle#1HG".to_string(),
            property: "color".to_string(),
            class_name: "org.acme.Vehicle".to_string(),
        }
    );
}

#[test]
fn test_undeclared_field_checked_before_missing_field() {
    let mm = load();
    let instance = Resource::new("org.acme", "Vehicle", "1HG").with("color", "red");
    let err = ResourceValidator::new(&mm).validate_resource(&instance).unwrap_err();
    assert!(matches!(err, ValidationError::UndeclaredField { .. }), "got: {err}");
}

#[test]
fn test_first_undeclared_field_in_data_order_reported() {
    let mm = load();
    let instance = vehicle("1HG").with("zeta", 1).with("alpha", 2);
    let err = ResourceValidator::new(&mm).validate_resource(&instance).unwrap_err();
    assert_eq!(
        err,
        ValidationError::UndeclaredField {
            resource_id: "org.acme.Vehicle#1HG".to_string(),
            property: "zeta".to_string(),
            class_name: "org.acme.Vehicle".to_string(),
        }
    );
}

#[test]
fn test_missing_identifier_field() {
    let mm = load();
    let instance = Resource::new("org.acme", "Vehicle", "1HG");
    let err = ResourceValidator::new(&mm).validate_resource(&instance).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingRequiredProperty {
            resource_id: "org.acme.Vehicle#1HG".to_string(),
            property: "vin".to_string(),
        }
    );
}

#[test]
fn test_inherited_properties_validated_on_subtype() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);
    let first_registered = Utc.with_ymd_and_hms(2021, 6, 1, 9, 30, 0).unwrap();

    let full = car("C1")
        .with("mileage", 500)
        .with("paint", "RED")
        .with("extras", vec![Value::from("GREEN"), Value::from("BLUE")])
        .with("firstRegistered", first_registered)
        .with("tags", vec![Value::from("fleet")])
        .with("registeredAt", address("DE"));
    validator.validate_resource(&full).unwrap();

    let err = validator
        .validate_resource(&car("C1").with("mileage", true))
        .unwrap_err();
    assert!(matches!(err, ValidationError::FieldTypeViolation { ref property, .. } if property == "mileage"));
}

#[test]
fn test_date_time_requires_date_time_value() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("firstRegistered", "2021-06-01"))
        .unwrap_err();
    match err {
        ValidationError::FieldTypeViolation { property, expected_type, actual_type, .. } => {
            assert_eq!(property, "firstRegistered");
            assert_eq!(expected_type, "DateTime");
            assert_eq!(actual_type, "string");
        }
        other => panic!("Expected FieldTypeViolation, got: {other}"),
    }
}

#[test]
fn test_array_fields() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);

    let err = validator
        .validate_resource(&car("C1").with("tags", "fleet"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::FieldTypeViolation { ref expected_type, .. } if expected_type == "String[]"));

    let err = validator
        .validate_resource(&car("C1").with("tags", vec![Value::from("a"), Value::Null]))
        .unwrap_err();
    assert!(matches!(err, ValidationError::FieldTypeViolation { ref actual_type, .. } if actual_type == "null"));

    validator
        .validate_resource(&car("C1").with("tags", Vec::<Value>::new()))
        .unwrap();
}

// -- Abstract and unknown types ------------------------------------------------

#[test]
fn test_abstract_class_rejected() {
    let mm = load();
    let prototype = Resource::new("org.acme", "Prototype", "P1").with("vin", "P1");
    let err = ResourceValidator::new(&mm).validate_resource(&prototype).unwrap_err();
    assert_eq!(
        err,
        ValidationError::AbstractClassViolation {
            class_name: "org.acme.Prototype".to_string(),
        }
    );
}

#[test]
fn test_abstract_class_reported_before_type_mismatch() {
    let mm = load();
    let driver = mm.get_type("org.acme.base.Driver").unwrap();
    let person = Resource::new("org.acme.base", "Person", "ann@example.com")
        .with("email", "ann@example.com")
        .with("name", "Ann");
    let err = ResourceValidator::new(&mm)
        .validate(driver, &Value::from(person))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::AbstractClassViolation {
            class_name: "org.acme.base.Person".to_string(),
        }
    );
}

#[test]
fn test_abstract_class_rejected_when_nested() {
    let mm = load();
    let prototype = Resource::new("org.acme", "Prototype", "P1").with("vin", "P1");
    let err = ResourceValidator::new(&mm)
        .validate_resource(&garage("G1", vec![Value::from(prototype)]))
        .unwrap_err();
    assert!(matches!(err, ValidationError::AbstractClassViolation { .. }), "got: {err}");
}

// -- Enumerations --------------------------------------------------------------

#[test]
fn test_invalid_enum_literal() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("paint", "PURPLE"))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidEnumValue {
            resource_id: "org.acme.Car#C1".to_string(),
            field: "paint".to_string(),
            enum_name: "org.acme.Color".to_string(),
            value: "\"PURPLE\"".to_string(),
        }
    );
}

#[test]
fn test_enum_array_checks_each_literal() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("extras", vec![Value::from("RED"), Value::from(3)]))
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidEnumValue { ref value, .. } if value == "3"));
}

#[test]
fn test_enum_in_nested_concept_from_other_namespace() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("registeredAt", address("FR")))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidEnumValue {
            resource_id: "org.acme.Car#C1".to_string(),
            field: "country".to_string(),
            enum_name: "org.acme.base.Country".to_string(),
            value: "\"FR\"".to_string(),
        }
    );
}

#[test]
fn test_nested_concept_missing_field() {
    let mm = load();
    let mut incomplete = address("UK");
    incomplete.remove("city");
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("registeredAt", incomplete))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingRequiredProperty {
            resource_id: "org.acme.Car#C1".to_string(),
            property: "city".to_string(),
        }
    );
}

// -- Relationships -------------------------------------------------------------

#[test]
fn test_relationship_accepts_subtypes_of_declared_type() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);

    for type_name in ["Person", "Driver", "Mechanic"] {
        validator
            .validate_resource(&car("C1").with("owner", person_ref(type_name, "ann@example.com")))
            .unwrap();
    }

    validator
        .validate_resource(&car("C1").with(
            "previousOwners",
            vec![person_ref("Driver", "a@x.org"), person_ref("Driver", "b@x.org")],
        ))
        .unwrap();
}

#[test]
fn test_relationship_accepts_subtype_from_importing_namespace() {
    let mm = load();
    let fleet_driver = Value::from(Relationship::new("org.acme", "FleetDriver", "f@x.org"));
    ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("previousOwners", vec![fleet_driver]))
        .unwrap();
}

#[test]
fn test_relationship_rejects_sibling_type() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with(
            "previousOwners",
            vec![person_ref("Driver", "a@x.org"), person_ref("Mechanic", "m@x.org")],
        ))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidFieldAssignment {
            resource_id: "org.acme.Car#C1".to_string(),
            property: "previousOwners".to_string(),
            actual_type: "org.acme.base.Mechanic".to_string(),
            expected_type: "org.acme.base.Driver".to_string(),
        }
    );
}

#[test]
fn test_relationship_array_requires_array() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("previousOwners", person_ref("Driver", "a@x.org")))
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidFieldAssignment { ref expected_type, .. } if expected_type == "Driver[]"));
}

#[test]
fn test_relationship_rejects_plain_string() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&car("C1").with("owner", "ann@example.com"))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::NotARelationship {
            resource_id: "org.acme.Car#C1".to_string(),
            class_name: "org.acme.base.Person".to_string(),
            value: "\"ann@example.com\"".to_string(),
        }
    );
}

// -- Polymorphic containment -----------------------------------------------------

#[test]
fn test_polymorphic_array_validates_concrete_type() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);

    let parked = vec![
        Value::from(vehicle("V1")),
        Value::from(car("C1").with("paint", "BLUE")),
    ];
    validator.validate_resource(&garage("G1", parked)).unwrap();

    // `paint` is only declared on Car, so the concrete type must drive the check.
    let bad_car = car("C2").with("paint", "PINK");
    let err = validator
        .validate_resource(&garage("G1", vec![Value::from(bad_car)]))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidEnumValue {
            resource_id: "org.acme.Car#C2".to_string(),
            field: "paint".to_string(),
            enum_name: "org.acme.Color".to_string(),
            value: "\"PINK\"".to_string(),
        }
    );
}

#[test]
fn test_polymorphic_array_rejects_unrelated_type() {
    let mm = load();
    let stranger = Resource::new("org.acme", "Garage", "G2")
        .with("garageId", "G2")
        .with("address", address("UK"))
        .with("parked", Vec::<Value>::new());
    let err = ResourceValidator::new(&mm)
        .validate_resource(&garage("G1", vec![Value::from(stranger)]))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidFieldAssignment {
            resource_id: "org.acme.Garage#G1".to_string(),
            property: "parked".to_string(),
            actual_type: "org.acme.Garage".to_string(),
            expected_type: "org.acme.Vehicle".to_string(),
        }
    );
}

#[test]
fn test_root_identifier_restored_after_nested_resource() {
    let mm = load();
    let record_without_time = Resource::concept("org.acme", "ServiceRecord")
        .with("mechanic", person_ref("Mechanic", "m@x.org"));
    let instance = garage("G1", vec![Value::from(car("C1"))])
        .with("history", vec![Value::from(record_without_time)]);
    let err = ResourceValidator::new(&mm).validate_resource(&instance).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingRequiredProperty {
            resource_id: "org.acme.Garage#G1".to_string(),
            property: "at".to_string(),
        }
    );
}

#[test]
fn test_validate_against_super_type_declaration() {
    let mm = load();
    let vehicle_decl = mm.get_type("org.acme.Vehicle").unwrap();
    let validator = ResourceValidator::new(&mm);

    validator
        .validate(vehicle_decl, &Value::from(car("C1").with("paint", "RED")))
        .unwrap();
    let err = validator
        .validate(vehicle_decl, &Value::from("not a vehicle"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::NotAResource { ref class_name, .. } if class_name == "org.acme.Vehicle"));
}

// -- Field validators --------------------------------------------------------------

#[test]
fn test_range_validator() {
    let mm = load();
    let err = ResourceValidator::new(&mm)
        .validate_resource(&vehicle("1HG").with("mileage", -1))
        .unwrap_err();
    match err {
        ValidationError::ValidatorViolation { resource_id, property, message } => {
            assert_eq!(resource_id, "org.acme.Vehicle#1HG");
            assert_eq!(property, "mileage");
            assert!(message.contains("lower bound"), "message: {message}");
        }
        other => panic!("Expected ValidatorViolation, got: {other}"),
    }
}

fn transfer(price: Value) -> Resource {
    Resource::new("org.acme", "Transfer", "T1")
        .with("transactionId", "T1")
        .with("vehicle", Relationship::new("org.acme", "Car", "C1"))
        .with("newOwner", person_ref("Driver", "ann@example.com"))
        .with("price", price)
        .with("cleared", false)
}

#[test]
fn test_transaction() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);

    validator.validate_resource(&transfer(Value::from(1500.5))).unwrap();
    validator.validate_resource(&transfer(Value::from(0))).unwrap();
    validator.validate_resource(&transfer(Value::from(1_000_000))).unwrap();

    let err = validator
        .validate_resource(&transfer(Value::from(1_000_000.01)))
        .unwrap_err();
    assert!(matches!(err, ValidationError::ValidatorViolation { ref property, .. } if property == "price"));

    let err = validator
        .validate_resource(&transfer(Value::from(10)).with("cleared", "yes"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::FieldTypeViolation { ref property, .. } if property == "cleared"));
}

#[test]
fn test_regex_validator_on_inherited_identifier() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);
    let driver = |email: &str| {
        Resource::new("org.acme.base", "Driver", email)
            .with("email", email)
            .with("name", "Ann")
            .with("licence", "L-1")
    };

    validator.validate_resource(&driver("ann@example.com")).unwrap();
    let err = validator.validate_resource(&driver("ann")).unwrap_err();
    assert!(matches!(err, ValidationError::ValidatorViolation { ref property, .. } if property == "email"));
}

// -- Registry configurations -------------------------------------------------------

#[test]
fn test_deferred_registry_with_missing_namespace() {
    let mut mm = ModelManager::with_options(ModelManagerOptions {
        import_validation: ImportValidation::Deferred,
    });
    let content = std::fs::read_to_string(repo_root().join("models/org.acme.yaml")).unwrap();
    mm.add_model_file(ModelFile::from_yaml_str(&content, "org.acme.yaml").unwrap())
        .unwrap();
    assert!(mm.validate_model_files().is_err());

    let validator = ResourceValidator::new(&mm);
    validator.validate_resource(&vehicle("1HG")).unwrap();

    let err = validator
        .validate_resource(&car("C1").with("registeredAt", address("UK")))
        .unwrap_err();
    assert!(matches!(err, ValidationError::FieldTypeViolation { ref property, .. } if property == "registeredAt"));

    let err = validator
        .validate_resource(&car("C1").with("owner", person_ref("Person", "a@x.org")))
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidFieldAssignment { ref property, .. } if property == "owner"));
}

#[test]
fn test_engine_config_drives_manager_and_validator() {
    let config = EngineConfig::from_yaml_str(
        "validator:\n  run_field_validators: false\n",
        "engine.yaml",
    )
    .unwrap();
    let mut mm = config.model_manager();
    mm.load_dir(repo_root().join("models")).unwrap();

    config
        .validator(&mm)
        .validate_resource(&vehicle("1HG").with("mileage", -5))
        .unwrap();
}

#[test]
fn test_validator_shared_across_threads() {
    let mm = load();
    let validator = ResourceValidator::new(&mm);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let validator = &validator;
                s.spawn(move || {
                    let vin = format!("V{i}");
                    validator.validate_resource(&vehicle(&vin).with("mileage", i))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    });
}
