use uuid::Uuid;
use wwtp_core::db::open_db_in_memory;
use wwtp_core::repo::equipment_repo::{EquipmentRepository, SqliteEquipmentRepository};
use wwtp_core::{
    ConflictError, DocumentDraft, DocumentType, EntityKind, EquipmentDraft, EquipmentStore,
    EquipmentType, ErrorKind, NewProjectEquipment, ProjectDraft, QuoteDraft, RepoError,
    ValidationError,
};

#[test]
fn create_parses_numeric_specs() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let mut draft = EquipmentDraft::new(" Wilo ", "EMU KPR 150", "pump");
    draft.power_hp = Some("25".to_string());
    draft.flow_gpm = Some(" 1500.5 ".to_string());
    draft.head_ft = Some("".to_string());
    draft.voltage = Some("460V/3Ph".to_string());

    let pump = store.catalog().create_equipment(&draft).unwrap();
    assert_eq!(pump.manufacturer, "Wilo");
    assert_eq!(pump.equipment_type, EquipmentType::Pump);
    assert_eq!(pump.specs.power_hp, Some(25.0));
    assert_eq!(pump.specs.flow_gpm, Some(1500.5));
    assert_eq!(pump.specs.head_ft, None);
    assert_eq!(pump.specs.voltage.as_deref(), Some("460V/3Ph"));
    assert_eq!(pump.display_name(), "Wilo EMU KPR 150 (Pump)");
}

#[test]
fn create_rejects_bad_input_without_writing() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let catalog = store.catalog();

    let err = catalog
        .create_equipment(&EquipmentDraft::new("", "EMU KPR 150", "Pump"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::Blank("manufacturer"))
    ));

    let mut draft = EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump");
    draft.power_hp = Some("twenty".to_string());
    let err = catalog.create_equipment(&draft).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidNumber {
            field: "power_hp",
            ..
        })
    ));

    draft.power_hp = Some("9".repeat(400));
    let err = catalog.create_equipment(&draft).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidNumber {
            field: "power_hp",
            ..
        })
    ));

    draft.power_hp = Some("-5".to_string());
    let err = catalog.create_equipment(&draft).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeNumber {
            field: "power_hp",
            ..
        })
    ));

    assert!(catalog.list_equipment(None).unwrap().is_empty());
}

#[test]
fn update_replaces_fields() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let catalog = store.catalog();
    let blower = catalog
        .create_equipment(&EquipmentDraft::new("Aerzen", "GM 35S", "Blower"))
        .unwrap();

    let mut draft = EquipmentDraft::new("Aerzen", "Delta Hybrid D 36S", "Blower");
    draft.subtype = Some("Rotary screw".to_string());
    let updated = catalog.update_equipment(blower.id, &draft).unwrap();
    assert_eq!(updated.id, blower.id);
    assert_eq!(updated.model, "Delta Hybrid D 36S");
    assert_eq!(updated.subtype.as_deref(), Some("Rotary screw"));

    let err = catalog.update_equipment(Uuid::new_v4(), &draft).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn verified_specs_are_stored_beside_cut_sheet_values() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let catalog = store.catalog();
    let mut draft = EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump");
    draft.power_hp = Some("25".to_string());
    draft.flow_gpm = Some("1500".to_string());
    let pump = catalog.create_equipment(&draft).unwrap();
    assert_eq!(pump.specs.power_hp_verified, None);

    draft.power_hp_verified = Some("27.5".to_string());
    draft.flow_gpm_verified = Some("1420".to_string());
    draft.head_ft_verified = Some("88".to_string());
    let verified = catalog.update_equipment(pump.id, &draft).unwrap();
    assert_eq!(verified.specs.power_hp, Some(25.0));
    assert_eq!(verified.specs.power_hp_verified, Some(27.5));
    assert_eq!(verified.specs.flow_gpm_verified, Some(1420.0));
    assert_eq!(verified.specs.head_ft_verified, Some(88.0));

    let reloaded = catalog.get_equipment(pump.id).unwrap().unwrap();
    assert_eq!(reloaded.specs, verified.specs);

    draft.head_ft_verified = Some("-1".to_string());
    assert!(matches!(
        catalog.update_equipment(pump.id, &draft).unwrap_err(),
        RepoError::Validation(ValidationError::NegativeNumber {
            field: "head_ft_verified",
            ..
        })
    ));
}

#[test]
fn search_is_case_insensitive_and_keeps_insertion_order() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let catalog = store.catalog();
    for (manufacturer, model, kind) in [
        ("Wilo", "EMU KPR 150", "Pump"),
        ("Aerzen", "GM 35S", "Blower"),
        ("Flygt", "NP 3153 Wilo-compatible", "Pump"),
        ("Überwasser", "UW-2", "Screen"),
        ("WILO", "Rexa Pro", "Pump"),
    ] {
        catalog
            .create_equipment(&EquipmentDraft::new(manufacturer, model, kind))
            .unwrap();
    }

    let models = |query: &str| {
        catalog
            .search_equipment(query)
            .collect_all()
            .unwrap()
            .into_iter()
            .map(|equipment| equipment.model)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        models("wilo"),
        ["EMU KPR 150", "NP 3153 Wilo-compatible", "Rexa Pro"]
    );
    assert_eq!(models("ÜBER"), ["UW-2"]);
    assert_eq!(models("screen"), ["UW-2"]);
    assert_eq!(models("").len(), 5);
    assert!(models("clarifier").is_empty());
}

#[test]
fn search_is_lazy_and_restartable() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let catalog = store.catalog();
    let search = catalog.search_equipment("pump");

    assert_eq!(search.iter().count(), 0);
    catalog
        .create_equipment(&EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump"))
        .unwrap();

    let mut first_pass = search.iter();
    assert_eq!(first_pass.next().unwrap().unwrap().manufacturer, "Wilo");
    assert!(first_pass.next().is_none());
    assert!(first_pass.next().is_none());

    let second_pass = search.iter().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(second_pass.len(), 1);
}

#[test]
fn scan_cursor_survives_deletes_and_vacuum() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::new(&conn);
    let mut ids = Vec::new();
    for model in ["A-1", "A-2", "A-3", "A-4", "A-5"] {
        ids.push(
            repo.create_equipment(&EquipmentDraft::new("Wilo", model, "Pump"))
                .unwrap()
                .id,
        );
    }

    let first_page = repo.scan_equipment(None, 2).unwrap();
    assert_eq!(first_page.len(), 2);
    let cursor = first_page[1].seq;

    repo.delete_equipment(ids[0]).unwrap();
    repo.delete_equipment(ids[2]).unwrap();
    conn.execute_batch("VACUUM;").unwrap();

    let rest = repo
        .scan_equipment(Some(cursor), 10)
        .unwrap()
        .into_iter()
        .map(|scanned| scanned.equipment.model)
        .collect::<Vec<_>>();
    assert_eq!(rest, ["A-4", "A-5"]);

    let added = repo
        .create_equipment(&EquipmentDraft::new("Wilo", "A-6", "Pump"))
        .unwrap();
    let tail = repo.scan_equipment(Some(cursor), 10).unwrap();
    assert_eq!(tail.last().unwrap().equipment.id, added.id);
    assert!(tail.windows(2).all(|pair| pair[0].seq < pair[1].seq));
}

#[test]
fn delete_is_blocked_while_referenced_then_cascades() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let project = store
        .projects()
        .create_project(&ProjectDraft::new("Rio Del Oro WWTP Upgrade"))
        .unwrap();
    let pump = store
        .catalog()
        .create_equipment(&EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump"))
        .unwrap();
    store
        .quotes()
        .create_quote(&QuoteDraft::new(pump.id, "Xylem").with_price(45_000.0))
        .unwrap();
    store
        .documents()
        .register_document(&DocumentDraft::new(
            pump.id,
            DocumentType::Cutsheet,
            "kpr150.pdf",
            "equipment/kpr150.pdf",
        ))
        .unwrap();
    let instance = store
        .project_equipment()
        .add_project_equipment(&NewProjectEquipment::new(project.id, pump.id, "P-101"))
        .unwrap();

    let err = store.catalog().delete_equipment(pump.id).unwrap_err();
    match &err {
        RepoError::Conflict(ConflictError::EquipmentInUse {
            equipment_id,
            references,
        }) => {
            assert_eq!(*equipment_id, pump.id);
            assert_eq!(references.len(), 1);
            assert_eq!(references[0].pid_tag, "P-101");
            assert_eq!(references[0].project_name, "Rio Del Oro WWTP Upgrade");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("P-101"));
    assert!(store.catalog().get_equipment(pump.id).unwrap().is_some());

    store
        .project_equipment()
        .remove_project_equipment(instance.id)
        .unwrap();
    let removal = store.catalog().delete_equipment(pump.id).unwrap();
    assert_eq!(removal.quotes_removed, 1);
    assert_eq!(removal.documents_removed, 1);

    let stats = store.stats().unwrap();
    assert_eq!(stats.equipment, 0);
    assert_eq!(stats.quotes, 0);
    assert_eq!(stats.documents, 0);
    assert_eq!(stats.projects, 1);
}

#[test]
fn delete_is_blocked_when_a_quote_is_linked_from_other_equipment() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let project = store
        .projects()
        .create_project(&ProjectDraft::new("Plant A"))
        .unwrap();
    let pump = store
        .catalog()
        .create_equipment(&EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump"))
        .unwrap();
    let spare = store
        .catalog()
        .create_equipment(&EquipmentDraft::new("Flygt", "NP 3153", "Pump"))
        .unwrap();
    let spare_quote = store
        .quotes()
        .create_quote(&QuoteDraft::new(spare.id, "Xylem"))
        .unwrap();
    store
        .project_equipment()
        .add_project_equipment(
            &NewProjectEquipment::new(project.id, pump.id, "P-101").with_quote(spare_quote.id),
        )
        .unwrap();

    let err = store.catalog().delete_equipment(spare.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn delete_unknown_equipment_is_not_found() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let err = store.catalog().delete_equipment(Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: EntityKind::Equipment,
            ..
        }
    ));
}
