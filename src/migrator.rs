use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_indents_table::Migration),
            Box::new(m20240101_000002_create_indent_items_table::Migration),
            Box::new(m20240101_000003_create_calculation_tables::Migration),
            Box::new(m20240101_000004_create_org_tables::Migration),
            Box::new(m20240101_000005_create_products_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_indents_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_indents_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Indents::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Indents::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Indents::EnterpriseId).uuid().not_null())
                        .col(ColumnDef::new(Indents::IndentNumber).string().not_null())
                        .col(ColumnDef::new(Indents::DealerId).uuid().not_null())
                        .col(ColumnDef::new(Indents::DealerUserId).uuid().not_null())
                        .col(ColumnDef::new(Indents::LegalEntityId).uuid().not_null())
                        .col(ColumnDef::new(Indents::DivisionId).uuid().not_null())
                        .col(ColumnDef::new(Indents::PlantId).uuid().not_null())
                        .col(ColumnDef::new(Indents::SalesOfficeId).uuid().not_null())
                        .col(ColumnDef::new(Indents::SalesGroupId).uuid().not_null())
                        .col(ColumnDef::new(Indents::Status).string().not_null())
                        .col(
                            ColumnDef::new(Indents::BaseAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::TotalDiscount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::HandlingCharges)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::TotalTax)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::TotalTcs)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::RoundOff)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::FinalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Indents::TotalWeight)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Indents::BrandNames).string().null())
                        .col(ColumnDef::new(Indents::ItemDescriptions).string().null())
                        .col(ColumnDef::new(Indents::ItemCodes).string().null())
                        .col(ColumnDef::new(Indents::CreatedBy).string().not_null())
                        .col(ColumnDef::new(Indents::UpdatedBy).string().null())
                        .col(ColumnDef::new(Indents::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Indents::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(Indents::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            // The reconciliation unique key
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_indents_enterprise_number")
                        .table(Indents::Table)
                        .col(Indents::EnterpriseId)
                        .col(Indents::IndentNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_indents_dealer_id")
                        .table(Indents::Table)
                        .col(Indents::DealerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Indents::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Indents {
        Table,
        Id,
        EnterpriseId,
        IndentNumber,
        DealerId,
        DealerUserId,
        LegalEntityId,
        DivisionId,
        PlantId,
        SalesOfficeId,
        SalesGroupId,
        Status,
        BaseAmount,
        TotalDiscount,
        HandlingCharges,
        TotalTax,
        TotalTcs,
        RoundOff,
        FinalAmount,
        TotalWeight,
        BrandNames,
        ItemDescriptions,
        ItemCodes,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240101_000002_create_indent_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_indent_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(IndentItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(IndentItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(IndentItems::IndentId).uuid().not_null())
                        .col(ColumnDef::new(IndentItems::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(IndentItems::MaterialCode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(IndentItems::QualityCode)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(IndentItems::TopDesign).string().null())
                        .col(ColumnDef::new(IndentItems::Quantity).decimal().not_null())
                        .col(ColumnDef::new(IndentItems::Unit).string().not_null())
                        .col(ColumnDef::new(IndentItems::Pcs).integer().not_null())
                        .col(ColumnDef::new(IndentItems::Rate).decimal().not_null())
                        .col(ColumnDef::new(IndentItems::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(IndentItems::WeightTons)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(IndentItems::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(IndentItems::HandlingCharges)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(IndentItems::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(IndentItems::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_indent_items_indent_id")
                                .from(IndentItems::Table, IndentItems::IndentId)
                                .to(
                                    super::m20240101_000001_create_indents_table::Indents::Table,
                                    super::m20240101_000001_create_indents_table::Indents::Id,
                                )
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_indent_items_indent_id")
                        .table(IndentItems::Table)
                        .col(IndentItems::IndentId)
                        .to_owned(),
                )
                .await?;

            // Natural key must be unique within one indent
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_indent_items_natural_key")
                        .table(IndentItems::Table)
                        .col(IndentItems::IndentId)
                        .col(IndentItems::MaterialCode)
                        .col(IndentItems::QualityCode)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(IndentItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum IndentItems {
        Table,
        Id,
        IndentId,
        ProductId,
        MaterialCode,
        QualityCode,
        TopDesign,
        Quantity,
        Unit,
        Pcs,
        Rate,
        Amount,
        WeightTons,
        DiscountAmount,
        HandlingCharges,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_calculation_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_calculation_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CalculationLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CalculationLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CalculationLines::IndentId).uuid().not_null())
                        .col(ColumnDef::new(CalculationLines::ItemId).uuid().null())
                        .col(ColumnDef::new(CalculationLines::Code).string().not_null())
                        .col(ColumnDef::new(CalculationLines::Description).string().null())
                        .col(ColumnDef::new(CalculationLines::Rate).decimal().not_null())
                        .col(ColumnDef::new(CalculationLines::Unit).string().not_null())
                        .col(ColumnDef::new(CalculationLines::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(CalculationLines::Sequence)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_calculation_lines_indent_id")
                        .table(CalculationLines::Table)
                        .col(CalculationLines::IndentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_calculation_lines_item_id")
                        .table(CalculationLines::Table)
                        .col(CalculationLines::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CalculationDefinitions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CalculationDefinitions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::EnterpriseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::LegalEntityId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::EntityType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::CalcType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::Code)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::Description)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::Value)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::Unit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::Sequence)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::IsAddition)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::IsCompound)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::DependsOn)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CalculationDefinitions::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_calc_defs_enterprise_scope")
                        .table(CalculationDefinitions::Table)
                        .col(CalculationDefinitions::EnterpriseId)
                        .col(CalculationDefinitions::EntityType)
                        .col(CalculationDefinitions::Code)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CalculationLines::Table).to_owned())
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(CalculationDefinitions::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(Iden)]
    pub enum CalculationLines {
        Table,
        Id,
        IndentId,
        ItemId,
        Code,
        Description,
        Rate,
        Unit,
        Amount,
        Sequence,
    }

    #[derive(Iden)]
    pub enum CalculationDefinitions {
        Table,
        Id,
        EnterpriseId,
        LegalEntityId,
        EntityType,
        CalcType,
        Code,
        Description,
        Value,
        Unit,
        Sequence,
        IsAddition,
        IsCompound,
        DependsOn,
        IsActive,
    }
}

mod m20240101_000004_create_org_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_org_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrgUnits::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrgUnits::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrgUnits::EnterpriseId).uuid().not_null())
                        .col(ColumnDef::new(OrgUnits::UnitType).string().not_null())
                        .col(ColumnDef::new(OrgUnits::Code).string().not_null())
                        .col(ColumnDef::new(OrgUnits::Name).string().not_null())
                        .col(
                            ColumnDef::new(OrgUnits::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_org_units_lookup")
                        .table(OrgUnits::Table)
                        .col(OrgUnits::EnterpriseId)
                        .col(OrgUnits::UnitType)
                        .col(OrgUnits::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DealerMappings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DealerMappings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DealerMappings::EnterpriseId).uuid().not_null())
                        .col(ColumnDef::new(DealerMappings::DealerId).uuid().not_null())
                        .col(ColumnDef::new(DealerMappings::PlantId).uuid().not_null())
                        .col(
                            ColumnDef::new(DealerMappings::SalesOfficeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DealerMappings::SalesGroupId)
                                .uuid()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_dealer_mappings_dealer_id")
                        .table(DealerMappings::Table)
                        .col(DealerMappings::DealerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EnterpriseSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EnterpriseSettings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnterpriseSettings::EnterpriseId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(EnterpriseSettings::WeightBasis)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnterpriseSettings::ItemMatchKey)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnterpriseSettings::PriceCalcCode)
                                .string()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TcsRates::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TcsRates::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(TcsRates::EnterpriseId).uuid().not_null())
                        .col(ColumnDef::new(TcsRates::LegalEntityId).uuid().not_null())
                        .col(ColumnDef::new(TcsRates::UserId).uuid().not_null())
                        .col(ColumnDef::new(TcsRates::Percentage).decimal().not_null())
                        .col(
                            ColumnDef::new(TcsRates::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tcs_rates_user")
                        .table(TcsRates::Table)
                        .col(TcsRates::EnterpriseId)
                        .col(TcsRates::LegalEntityId)
                        .col(TcsRates::UserId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrgUnits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DealerMappings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EnterpriseSettings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TcsRates::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum OrgUnits {
        Table,
        Id,
        EnterpriseId,
        UnitType,
        Code,
        Name,
        IsActive,
    }

    #[derive(Iden)]
    pub enum DealerMappings {
        Table,
        Id,
        EnterpriseId,
        DealerId,
        PlantId,
        SalesOfficeId,
        SalesGroupId,
    }

    #[derive(Iden)]
    pub enum EnterpriseSettings {
        Table,
        Id,
        EnterpriseId,
        WeightBasis,
        ItemMatchKey,
        PriceCalcCode,
    }

    #[derive(Iden)]
    pub enum TcsRates {
        Table,
        Id,
        EnterpriseId,
        LegalEntityId,
        UserId,
        Percentage,
        IsActive,
    }
}

mod m20240101_000005_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::EnterpriseId).uuid().not_null())
                        .col(ColumnDef::new(Products::MaterialCode).string().not_null())
                        .col(
                            ColumnDef::new(Products::TradingMaterialCode)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Products::QualityCode).string().null())
                        .col(ColumnDef::new(Products::DivisionId).uuid().null())
                        .col(ColumnDef::new(Products::PlantId).uuid().null())
                        .col(ColumnDef::new(Products::Description).string().null())
                        .col(ColumnDef::new(Products::Brand).string().null())
                        .col(
                            ColumnDef::new(Products::GrossWeight)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::NetWeight)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::IsDisplayed)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_material_code")
                        .table(Products::Table)
                        .col(Products::EnterpriseId)
                        .col(Products::MaterialCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_trading_code")
                        .table(Products::Table)
                        .col(Products::EnterpriseId)
                        .col(Products::TradingMaterialCode)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Products {
        Table,
        Id,
        EnterpriseId,
        MaterialCode,
        TradingMaterialCode,
        QualityCode,
        DivisionId,
        PlantId,
        Description,
        Brand,
        GrossWeight,
        NetWeight,
        IsActive,
        IsDisplayed,
        CreatedAt,
    }
}
