//! GraphQL documents sent to the Admin API.
//!
//! Every connection query takes `$first` and `$after` and selects
//! `pageInfo { hasNextPage endCursor }`.

/// Shop identity, used to verify a token on registration.
pub const SHOP: &str = r"
query Shop {
  shop {
    name
    myshopifyDomain
    currencyCode
  }
}
";

pub const PRODUCTS: &str = r"
query Products($first: Int!, $after: String) {
  products(first: $first, after: $after, sortKey: ID) {
    nodes {
      id
      title
      handle
      vendor
      productType
      status
      totalInventory
      createdAt
      updatedAt
      priceRangeV2 {
        minVariantPrice {
          amount
          currencyCode
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// Line items are capped per order; truncation is logged by the mapper.
pub const ORDERS: &str = r"
query Orders($first: Int!, $after: String) {
  orders(first: $first, after: $after, sortKey: ID) {
    nodes {
      id
      name
      email
      createdAt
      processedAt
      displayFinancialStatus
      displayFulfillmentStatus
      totalPriceSet {
        shopMoney {
          amount
          currencyCode
        }
      }
      customer {
        id
      }
      lineItems(first: 100) {
        nodes {
          id
          title
          sku
          quantity
          product {
            id
          }
          variant {
            id
          }
          originalUnitPriceSet {
            shopMoney {
              amount
              currencyCode
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

pub const CUSTOMERS: &str = r"
query Customers($first: Int!, $after: String) {
  customers(first: $first, after: $after, sortKey: ID) {
    nodes {
      id
      firstName
      lastName
      email
      phone
      numberOfOrders
      createdAt
      amountSpent {
        amount
        currencyCode
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";
