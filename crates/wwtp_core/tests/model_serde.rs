use serde_json::json;
use wwtp_core::{
    DocumentType, EquipmentDraft, EquipmentMaster, EquipmentStatus, EquipmentStore, EquipmentType,
    NewProjectEquipment, ProjectDraft, ProjectEquipment,
};

#[test]
fn status_and_document_labels_serialize_as_stored() {
    assert_eq!(serde_json::to_value(EquipmentStatus::Tbd).unwrap(), json!("TBD"));
    assert_eq!(
        serde_json::to_value(EquipmentStatus::Replace).unwrap(),
        json!("replace")
    );
    assert_eq!(
        serde_json::from_value::<EquipmentStatus>(json!("existing")).unwrap(),
        EquipmentStatus::Existing
    );
    assert_eq!(
        serde_json::to_value(DocumentType::Submittal).unwrap(),
        json!("submittal")
    );
}

#[test]
fn equipment_type_serializes_as_its_label() {
    assert_eq!(serde_json::to_value(EquipmentType::Pump).unwrap(), json!("Pump"));
    assert_eq!(
        serde_json::from_value::<EquipmentType>(json!("Grit Classifier")).unwrap(),
        EquipmentType::Custom("Grit Classifier".to_string())
    );
    assert!(serde_json::from_value::<EquipmentType>(json!("  ")).is_err());
}

#[test]
fn stored_rows_serialize_for_export_consumers() {
    let store = EquipmentStore::open_in_memory().unwrap();
    let project = store
        .projects()
        .create_project(&ProjectDraft::new("Rio Del Oro WWTP Upgrade"))
        .unwrap();
    let mut draft = EquipmentDraft::new("Wilo", "EMU KPR 150", "Pump");
    draft.power_hp = Some("25".to_string());
    let pump = store.catalog().create_equipment(&draft).unwrap();
    let instance = store
        .project_equipment()
        .add_project_equipment(
            &NewProjectEquipment::new(project.id, pump.id, "P-101")
                .with_status(EquipmentStatus::Tbd)
                .with_quantity(2),
        )
        .unwrap();

    let value = serde_json::to_value(&instance).unwrap();
    assert_eq!(value["pid_tag"], json!("P-101"));
    assert_eq!(value["status"], json!("TBD"));
    assert_eq!(value["quantity"], json!(2));
    assert_eq!(value["project_id"], json!(project.id.to_string()));
    let decoded: ProjectEquipment = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, instance);

    let value = serde_json::to_value(&pump).unwrap();
    assert_eq!(value["equipment_type"], json!("Pump"));
    assert_eq!(value["specs"]["power_hp"], json!(25.0));
    assert_eq!(value["specs"]["flow_gpm"], json!(null));
    let decoded: EquipmentMaster = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, pump);
}
