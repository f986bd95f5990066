use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BrokerProviders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerProviders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrokerProviders::Name).string().not_null())
                    .col(
                        ColumnDef::new(BrokerProviders::ProviderType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BrokerProviders::BaseUrl).string().null())
                    .col(ColumnDef::new(BrokerProviders::Models).text().not_null())
                    .col(ColumnDef::new(BrokerProviders::DefaultModel).string().null())
                    .col(ColumnDef::new(BrokerProviders::FastModel).string().null())
                    .col(ColumnDef::new(BrokerProviders::CapableModel).string().null())
                    .col(
                        ColumnDef::new(BrokerProviders::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BrokerProviders::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(BrokerProviders::Rpm).integer().not_null())
                    .col(ColumnDef::new(BrokerProviders::Tpm).integer().not_null())
                    .col(
                        ColumnDef::new(BrokerProviders::TimeoutSecs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviders::FallbackProvider)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerRoutingRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerRoutingRules::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::Conditions)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::TargetProvider)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::TargetModel)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BrokerRoutingRules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerResponseCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerResponseCache::Fingerprint)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrokerResponseCache::Data).text().not_null())
                    .col(ColumnDef::new(BrokerResponseCache::ModelUsed).string().null())
                    .col(
                        ColumnDef::new(BrokerResponseCache::ProviderUsed)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BrokerResponseCache::TokensUsed)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(BrokerResponseCache::Cost).double().null())
                    .col(
                        ColumnDef::new(BrokerResponseCache::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerResponseCache::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerResponseCache::HitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BrokerResponseCache::LastAccessed)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_broker_response_cache_last_accessed")
                    .table(BrokerResponseCache::Table)
                    .col(BrokerResponseCache::LastAccessed)
                    .col(BrokerResponseCache::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerProviderHealth::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerProviderHealth::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviderHealth::ProviderId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviderHealth::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviderHealth::CheckedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviderHealth::ResponseTimeMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerProviderHealth::ErrorRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(BrokerProviderHealth::RateLimitRemaining)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(BrokerProviderHealth::Error).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_broker_provider_health_provider_checked")
                    .table(BrokerProviderHealth::Table)
                    .col(BrokerProviderHealth::ProviderId)
                    .col(BrokerProviderHealth::CheckedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BrokerRequestLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrokerRequestLogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BrokerRequestLogs::RequestId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BrokerRequestLogs::UserId).string().not_null())
                    .col(
                        ColumnDef::new(BrokerRequestLogs::ConversationId)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(BrokerRequestLogs::Kind).string().null())
                    .col(
                        ColumnDef::new(BrokerRequestLogs::Priority)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BrokerRequestLogs::ProviderId).string().null())
                    .col(ColumnDef::new(BrokerRequestLogs::Model).string().null())
                    .col(ColumnDef::new(BrokerRequestLogs::TokensUsed).integer().null())
                    .col(ColumnDef::new(BrokerRequestLogs::Cost).double().null())
                    .col(
                        ColumnDef::new(BrokerRequestLogs::ProcessingTimeMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BrokerRequestLogs::Cached)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BrokerRequestLogs::Streaming)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BrokerRequestLogs::Success)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BrokerRequestLogs::ErrorCode).string().null())
                    .col(ColumnDef::new(BrokerRequestLogs::ErrorMessage).text().null())
                    .col(ColumnDef::new(BrokerRequestLogs::Attempts).text().not_null())
                    .col(
                        ColumnDef::new(BrokerRequestLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_broker_request_logs_created_at")
                    .table(BrokerRequestLogs::Table)
                    .col(BrokerRequestLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BrokerRequestLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerProviderHealth::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerResponseCache::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerRoutingRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BrokerProviders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BrokerProviders {
    Table,
    Id,
    Name,
    ProviderType,
    BaseUrl,
    Models,
    DefaultModel,
    FastModel,
    CapableModel,
    Priority,
    Enabled,
    Rpm,
    Tpm,
    TimeoutSecs,
    FallbackProvider,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BrokerRoutingRules {
    Table,
    Id,
    Name,
    Priority,
    Enabled,
    Conditions,
    TargetProvider,
    TargetModel,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BrokerResponseCache {
    Table,
    Fingerprint,
    Data,
    ModelUsed,
    ProviderUsed,
    TokensUsed,
    Cost,
    CreatedAt,
    ExpiresAt,
    HitCount,
    LastAccessed,
}

#[derive(DeriveIden)]
enum BrokerProviderHealth {
    Table,
    Id,
    ProviderId,
    Status,
    CheckedAt,
    ResponseTimeMs,
    ErrorRate,
    RateLimitRemaining,
    Error,
}

#[derive(DeriveIden)]
enum BrokerRequestLogs {
    Table,
    Id,
    RequestId,
    UserId,
    ConversationId,
    Kind,
    Priority,
    ProviderId,
    Model,
    TokensUsed,
    Cost,
    ProcessingTimeMs,
    Cached,
    Streaming,
    Success,
    ErrorCode,
    ErrorMessage,
    Attempts,
    CreatedAt,
}
